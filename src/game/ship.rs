//! Ships and the ship pool

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::game::agent::Agent;
use crate::game::constants::weapons::{CANNON_MOUNTS, MISSILE_LOADOUT};

/// Index of a ship slot in the [`ShipPool`]
pub type ShipId = usize;

/// The two sides of a battle. Human "allies" fly for `Valkyrie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Valkyrie,
    Raider,
}

impl Faction {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Faction::Valkyrie => 0,
            Faction::Raider => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Faction::Valkyrie => Faction::Raider,
            Faction::Raider => Faction::Valkyrie,
        }
    }
}

/// AI behaviour, evaluated every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Wander,
    Chase,
    Evade,
    Return,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Maneuver {
    #[default]
    None,
    Immelmann,
}

/// Per-ship combat statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub shots_fired: u32,
    pub shots_hitting: u32,
    pub missiles_fired: u32,
    pub kills: u32,
    /// Milliseconds spent alive in battle
    pub time_of_battle: f32,
}

impl Statistics {
    /// Hit ratio in [0, 1]
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hitting as f32 / self.shots_fired as f32
        }
    }
}

/// Parameters of a ship spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipSpawn {
    pub position: Vec3,
    pub rotation: Quat,
    pub faction: Faction,
    pub is_human: bool,
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct Ship {
    pub agent: Agent,
    pub faction: Faction,
    pub is_human: bool,
    /// The ship is invalid once life drops to zero
    pub life: f32,
    /// Set by spawn, cleared once the destruction has been processed
    pub active: bool,
    /// Presentation flag: mesh shown or hidden
    pub visible: bool,
    pub velocity: f32,
    pub speed_ratio: f32,
    /// Afterburner level in [-2, 2], negative while braking
    pub bursting: f32,
    /// Visual bank angle
    pub roll: f32,
    pub missile_cooldown: f32,
    pub available_missiles: u32,
    /// Alternates between left (0) and right (1) cannon
    pub cannon_index: usize,
    /// Muzzle mounts in model units; `None` until the hull is known
    pub cannons: Option<[Vec3; 2]>,
    pub ai_state: AiState,
    pub best_prey: Option<ShipId>,
    /// Milliseconds the current prey has been held
    pub best_prey_time: f32,
    pub maneuver: Maneuver,
    pub maneuver_timer: f32,
    pub evade_timer: f32,
    pub evade_to: Vec3,
    pub avoid_to: Vec3,
    pub dot_to_enemy: f32,
    pub dot_to_ally: f32,
    pub trail: Option<usize>,
    /// Last ship that damaged this one, credited with the kill
    pub last_attacker: Option<ShipId>,
    pub thruster_volume: f32,
    pub stats: Statistics,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            agent: Agent::default(),
            faction: Faction::Valkyrie,
            is_human: false,
            life: 0.0,
            active: false,
            visible: false,
            velocity: 0.0,
            speed_ratio: 0.0,
            bursting: 0.0,
            roll: 0.0,
            missile_cooldown: 0.0,
            available_missiles: 0,
            cannon_index: 0,
            cannons: None,
            ai_state: AiState::Wander,
            best_prey: None,
            best_prey_time: 0.0,
            maneuver: Maneuver::None,
            maneuver_timer: 0.0,
            evade_timer: 0.0,
            evade_to: Vec3::ZERO,
            avoid_to: Vec3::ZERO,
            dot_to_enemy: -1.0,
            dot_to_ally: -1.0,
            trail: None,
            last_attacker: None,
            thruster_volume: 0.0,
            stats: Statistics::default(),
        }
    }
}

impl Ship {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.life > 0.0
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.agent.position
    }

    /// Reset every field and activate the slot.
    pub fn spawn(&mut self, spawn: &ShipSpawn) {
        *self = Self {
            agent: Agent::new(spawn.position, spawn.rotation),
            faction: spawn.faction,
            is_human: spawn.is_human,
            life: spawn.life,
            active: true,
            visible: true,
            available_missiles: MISSILE_LOADOUT[spawn.faction.index()],
            cannons: Some(CANNON_MOUNTS[spawn.faction.index()]),
            ..Default::default()
        };
    }
}

/// Fixed-capacity ship arena
#[derive(Debug, Clone)]
pub struct ShipPool {
    ships: Vec<Ship>,
}

impl ShipPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            ships: vec![Ship::default(); capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ships.len()
    }

    /// Activate the first slot that is not in use.
    ///
    /// Returns `None` when every slot is taken.
    pub fn spawn(&mut self, spawn: &ShipSpawn) -> Option<ShipId> {
        let index = self.ships.iter().position(|s| !s.active)?;
        self.ships[index].spawn(spawn);
        Some(index)
    }

    #[inline]
    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    /// `true` when `id` names a living ship
    #[inline]
    pub fn is_valid(&self, id: ShipId) -> bool {
        self.ships.get(id).map_or(false, Ship::is_valid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        self.ships.iter_mut()
    }

    pub fn as_slice(&self) -> &[Ship] {
        &self.ships
    }

    pub fn as_mut_slice(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    pub fn valid_count(&self) -> usize {
        self.ships.iter().filter(|s| s.is_valid()).count()
    }

    pub fn valid_in_faction(&self, faction: Faction) -> usize {
        self.ships
            .iter()
            .filter(|s| s.is_valid() && s.faction == faction)
            .count()
    }

    /// Number of AI ships other than `except` whose prey is `target`
    pub fn ai_targeting(&self, target: ShipId, except: ShipId) -> usize {
        self.ships
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != except && *i != target && !s.is_human && s.best_prey == Some(target))
            .count()
    }

    /// First living human ship
    pub fn human(&self) -> Option<ShipId> {
        self.ships.iter().position(|s| s.is_valid() && s.is_human)
    }
}
