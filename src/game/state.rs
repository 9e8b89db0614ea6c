//! Simulation state
//!
//! Owns every pool of a battle plus the asteroid field and the seeded random
//! generator. Nothing in here allocates once the battle is built.

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::game::camera::ShipCamera;
use crate::game::constants::camera::DEFAULT_ASPECT;
use crate::game::constants::pool::MAX_MISSILES;
use crate::game::constants::spawn::{AI_SCATTER, CLEAR_RADIUS, FLEET_OFFSET_Z, HUMAN_SPACING};
use crate::game::constants::trail::{FACTION_COLORS, SIDE_ALLIES, SIDE_ENEMIES};
use crate::game::definition::GameDefinition;
use crate::game::effects::EffectPool;
use crate::game::events::{EventQueue, SimEvent, SoundCue};
use crate::game::missile::MissilePool;
use crate::game::ship::{Faction, ShipId, ShipPool, ShipSpawn};
use crate::game::shot::ShotPool;
use crate::game::trail::TrailPool;
use crate::game::world::{AsteroidField, AsteroidTemplate};
use crate::util::math::quat_from_euler;

#[derive(Debug, Clone)]
pub struct SimState {
    pub ships: ShipPool,
    pub shots: ShotPool,
    pub missiles: MissilePool,
    pub explosions: EffectPool,
    pub sparks: EffectPool,
    pub trails: TrailPool,
    pub field: AsteroidField,
    /// Chase cameras, indexed like `ships`; only human ships have one
    pub cameras: Vec<Option<ShipCamera>>,
    pub rng: StdRng,
    /// Asteroid crashes per faction
    pub crashes: [u32; 2],
    /// Scaled milliseconds since the battle started
    pub time: f32,
    /// Emit [`SimEvent::Sound`] cues
    pub audio: bool,
    pub events: EventQueue,
}

impl SimState {
    /// Empty arena with room for `max_ships` ships and no asteroids.
    pub fn with_capacity(max_ships: usize, seed: u64) -> Self {
        Self {
            ships: ShipPool::new(max_ships),
            shots: ShotPool::new(),
            missiles: MissilePool::new(),
            explosions: EffectPool::explosions(),
            sparks: EffectPool::sparks(),
            trails: TrailPool::new(max_ships + MAX_MISSILES),
            field: AsteroidField::default(),
            cameras: vec![None; max_ships],
            rng: StdRng::seed_from_u64(seed),
            crashes: [0; 2],
            time: 0.0,
            audio: true,
            events: EventQueue::new(),
        }
    }

    /// Build the battle described by `definition`: asteroid field first,
    /// then the four fleets, then clear the asteroids around both fleet
    /// origins.
    pub fn build(definition: &GameDefinition, template: &AsteroidTemplate) -> Self {
        let mut state = Self::with_capacity(definition.max_ships(), definition.seed);
        state.field = AsteroidField::generate(
            &mut state.rng,
            template,
            definition.asteroid_count,
            definition.asteroid_radius,
        );

        let enemy_heading = quat_from_euler(0.0, std::f32::consts::PI, 0.0);
        for i in 0..definition.human_allies {
            let position = Vec3::new(i as f32 * HUMAN_SPACING, 0.0, -FLEET_OFFSET_Z);
            state.spawn_ship(position, Quat::IDENTITY, Faction::Valkyrie, true, definition.human_allies_life);
        }
        for i in 0..definition.human_enemies {
            let position = Vec3::new(i as f32 * HUMAN_SPACING, 0.0, FLEET_OFFSET_Z);
            state.spawn_ship(position, enemy_heading, Faction::Raider, true, definition.human_enemies_life);
        }
        for _ in 0..definition.ai_allies {
            let (position, rotation) = state.scatter(-FLEET_OFFSET_Z);
            state.spawn_ship(position, rotation, Faction::Valkyrie, false, definition.ai_allies_life);
        }
        for _ in 0..definition.ai_enemies {
            let (position, rotation) = state.scatter(FLEET_OFFSET_Z);
            state.spawn_ship(position, rotation, Faction::Raider, false, definition.ai_enemies_life);
        }

        let removed = state.field.remove_near(Vec3::new(0.0, 0.0, -FLEET_OFFSET_Z), CLEAR_RADIUS)
            + state.field.remove_near(Vec3::new(0.0, 0.0, FLEET_OFFSET_Z), CLEAR_RADIUS);
        info!(
            "Battle built: {} ships, {} asteroids ({} cleared), seed {}",
            state.ships.valid_count(),
            state.field.len(),
            removed,
            definition.seed
        );
        state
    }

    fn scatter(&mut self, z: f32) -> (Vec3, Quat) {
        let mut offset = || self.rng.gen::<f32>() * AI_SCATTER * 2.0 - AI_SCATTER;
        let position = Vec3::new(offset(), offset(), offset() + z);
        let mut angle = || self.rng.gen::<f32>() * std::f32::consts::TAU;
        let rotation = quat_from_euler(angle(), angle(), angle());
        (position, rotation)
    }

    /// Spawn a ship with its trail and, for humans, a chase camera.
    pub fn spawn_ship(
        &mut self,
        position: Vec3,
        rotation: Quat,
        faction: Faction,
        is_human: bool,
        life: f32,
    ) -> Option<ShipId> {
        let spawn = ShipSpawn {
            position,
            rotation,
            faction,
            is_human,
            life,
        };
        let Some(id) = self.ships.spawn(&spawn) else {
            debug!("Ship pool exhausted, spawn skipped");
            return None;
        };
        let side = match faction {
            Faction::Valkyrie => SIDE_ALLIES,
            Faction::Raider => SIDE_ENEMIES,
        };
        let trail = self.trails.spawn(position, side, FACTION_COLORS[faction.index()]);
        if let Some(trail) = trail {
            self.trails.set_visible(trail, !is_human);
        }
        let ship = self.ships.get_mut(id)?;
        ship.trail = trail;
        if let Some(slot) = self.cameras.get_mut(id) {
            *slot = if is_human {
                Some(ShipCamera::follow(ship, DEFAULT_ASPECT))
            } else {
                None
            };
        }
        Some(id)
    }

    #[inline]
    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn cue(&mut self, cue: SoundCue) {
        if self.audio {
            self.events.push(SimEvent::Sound(cue));
        }
    }

    /// Uniform draw in [0, 1) from the battle's generator
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Set the camera aspect ratio of every human ship.
    pub fn set_aspect(&mut self, aspect: f32) {
        for (id, slot) in self.cameras.iter_mut().enumerate() {
            if slot.is_none() {
                continue;
            }
            if let Some(ship) = self.ships.get(id) {
                *slot = Some(ShipCamera::follow(ship, aspect));
            }
        }
    }
}
