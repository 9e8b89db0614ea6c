//! Homing missiles

use glam::{Quat, Vec3};

use crate::game::agent::Agent;
use crate::game::constants::pool::MAX_MISSILES;
use crate::game::constants::weapons::{MISSILE_IDLE_TIME, MISSILE_MAX_LIFE_MS};
use crate::game::ship::ShipId;

#[derive(Debug, Clone)]
pub struct Missile {
    pub agent: Agent,
    /// Milliseconds since launch
    pub time: f32,
    pub target: Option<ShipId>,
    pub fired_by: Option<ShipId>,
    pub trail: Option<usize>,
}

impl Default for Missile {
    fn default() -> Self {
        Self {
            agent: Agent::default(),
            time: MISSILE_IDLE_TIME,
            target: None,
            fired_by: None,
            trail: None,
        }
    }
}

impl Missile {
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0.0..=MISSILE_MAX_LIFE_MS).contains(&self.time)
    }

    /// Set the clock, returns whether the missile is still flying.
    #[inline]
    pub fn set_time(&mut self, time: f32) -> bool {
        self.time = time;
        self.is_valid()
    }

    /// Push the clock past the end of life.
    #[inline]
    pub fn expire(&mut self) {
        self.time = MISSILE_MAX_LIFE_MS + 1.0;
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.agent.position
    }
}

#[derive(Debug, Clone)]
pub struct MissilePool {
    missiles: Vec<Missile>,
}

impl Default for MissilePool {
    fn default() -> Self {
        Self::new()
    }
}

impl MissilePool {
    pub fn new() -> Self {
        Self {
            missiles: vec![Missile::default(); MAX_MISSILES],
        }
    }

    /// Launch into the first slot that is not flying.
    pub fn launch(
        &mut self,
        target: ShipId,
        fired_by: ShipId,
        position: Vec3,
        rotation: Quat,
        trail: Option<usize>,
    ) -> Option<usize> {
        let index = self.missiles.iter().position(|m| !m.is_valid())?;
        let missile = &mut self.missiles[index];
        missile.agent.set_position_orientation(position, rotation);
        missile.agent.input = Default::default();
        missile.time = 0.0;
        missile.target = Some(target);
        missile.fired_by = Some(fired_by);
        missile.trail = trail;
        Some(index)
    }

    /// End every missile chasing `ship`; returns their trail handles.
    pub fn invalidate_chasing(&mut self, ship: ShipId) -> smallvec::SmallVec<[usize; 4]> {
        let mut trails = smallvec::SmallVec::new();
        for missile in &mut self.missiles {
            if missile.is_valid() && missile.target == Some(ship) {
                missile.expire();
                if let Some(trail) = missile.trail.take() {
                    trails.push(trail);
                }
            }
        }
        trails
    }

    /// Forget `ship` as the shooter of any missile.
    pub fn clear_shooter(&mut self, ship: ShipId) {
        for missile in &mut self.missiles {
            if missile.fired_by == Some(ship) {
                missile.fired_by = None;
            }
        }
    }

    pub fn valid_count(&self) -> usize {
        self.missiles.iter().filter(|m| m.is_valid()).count()
    }

    pub fn as_slice(&self) -> &[Missile] {
        &self.missiles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Missile] {
        &mut self.missiles
    }

    pub fn get(&self, index: usize) -> Option<&Missile> {
        self.missiles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Missile> {
        self.missiles.get_mut(index)
    }
}
