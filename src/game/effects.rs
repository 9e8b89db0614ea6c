//! Pooled timed effects: explosions and spark bursts

use glam::{Quat, Vec3};

use crate::game::constants::effects::{EXPLOSION_LIFE_MS, IDLE_TIME, SPARK_LIFE_MS};
use crate::game::constants::pool::{MAX_EXPLOSIONS, MAX_SPARKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Live while `0 <= time <= 2000`
    Explosion,
    /// Live while `0 <= time < 1000`
    Spark,
}

impl EffectKind {
    #[inline]
    pub fn is_live(self, time: f32) -> bool {
        match self {
            EffectKind::Explosion => (0.0..=EXPLOSION_LIFE_MS).contains(&time),
            EffectKind::Spark => (0.0..SPARK_LIFE_MS).contains(&time),
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            EffectKind::Explosion => MAX_EXPLOSIONS,
            EffectKind::Spark => MAX_SPARKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEffect {
    pub position: Vec3,
    pub rotation: Quat,
    /// Milliseconds since spawn
    pub time: f32,
    pub enabled: bool,
}

impl Default for TimedEffect {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            time: IDLE_TIME,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EffectPool {
    kind: EffectKind,
    effects: Vec<TimedEffect>,
}

impl EffectPool {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            effects: vec![TimedEffect::default(); kind.capacity()],
        }
    }

    pub fn explosions() -> Self {
        Self::new(EffectKind::Explosion)
    }

    pub fn sparks() -> Self {
        Self::new(EffectKind::Spark)
    }

    #[inline]
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Start the effect in the first idle slot. Silently does nothing when
    /// all slots are playing.
    pub fn spawn(&mut self, position: Vec3, rotation: Quat) -> Option<usize> {
        let kind = self.kind;
        let index = self.effects.iter().position(|e| !kind.is_live(e.time))?;
        self.effects[index] = TimedEffect {
            position,
            rotation,
            time: 0.0,
            enabled: true,
        };
        Some(index)
    }

    pub fn tick(&mut self, dt: f32) {
        let kind = self.kind;
        for effect in &mut self.effects {
            effect.time += dt;
            effect.enabled = kind.is_live(effect.time);
        }
    }

    pub fn live_count(&self) -> usize {
        self.effects.iter().filter(|e| self.kind.is_live(e.time)).count()
    }

    pub fn as_slice(&self) -> &[TimedEffect] {
        &self.effects
    }

    /// Place slot `index` and set its clock, used by replay.
    pub fn restore(&mut self, index: usize, position: Vec3, rotation: Quat, time: f32) {
        let kind = self.kind;
        if let Some(effect) = self.effects.get_mut(index) {
            effect.position = position;
            effect.rotation = rotation;
            effect.time = time;
            effect.enabled = kind.is_live(time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_pool_is_idle() {
        let pool = EffectPool::explosions();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.as_slice().len(), MAX_EXPLOSIONS);
    }

    #[test]
    fn test_explosion_window_is_inclusive() {
        let mut pool = EffectPool::explosions();
        pool.spawn(Vec3::ZERO, Quat::IDENTITY);
        pool.tick(EXPLOSION_LIFE_MS);
        assert_eq!(pool.live_count(), 1);
        pool.tick(0.5);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_spark_window_is_exclusive() {
        let mut pool = EffectPool::sparks();
        pool.spawn(Vec3::ZERO, Quat::IDENTITY);
        pool.tick(SPARK_LIFE_MS);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_full_pool_keeps_playing_effects() {
        let mut pool = EffectPool::explosions();
        for i in 0..MAX_EXPLOSIONS {
            assert_eq!(pool.spawn(Vec3::splat(i as f32), Quat::IDENTITY), Some(i));
        }
        assert_eq!(pool.spawn(Vec3::splat(99.0), Quat::IDENTITY), None);
        assert!(pool.as_slice().iter().all(|e| e.position.x < 99.0));
    }

    #[test]
    fn test_expired_slot_is_reused() {
        let mut pool = EffectPool::sparks();
        pool.spawn(Vec3::ONE, Quat::IDENTITY);
        pool.tick(SPARK_LIFE_MS + 1.0);
        assert_eq!(pool.spawn(Vec3::ZERO, Quat::IDENTITY), Some(0));
        assert_eq!(pool.as_slice()[0].time, 0.0);
    }
}
