//! Cannon shots
//!
//! Shot transforms live in one flat column-major matrix buffer that hosts
//! can upload as instance data. Slot `i` of [`ShotPool::records`] owns
//! floats `16*i..16*i+16`; the two are only ever touched together.

use glam::{Mat4, Vec3};

use crate::game::constants::pool::{MATRIX_STRIDE, MAX_SHOTS, SHOTS_PER_FACTION};
use crate::game::constants::weapons::{MOUNT_SCALE, MUZZLE_FORWARD_NUDGE, SHOT_SPEED, SHOT_TTL_MS};
use crate::game::ship::{Faction, ShipId};
use crate::game::world::AsteroidField;

/// Bookkeeping half of a shot slot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShotRecord {
    /// Remaining lifetime; the slot is free at `<= 0`
    pub ttl: f32,
    pub fired_by: Option<ShipId>,
}

impl ShotRecord {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ttl > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ShotPool {
    matrices: Vec<f32>,
    records: Vec<ShotRecord>,
}

impl Default for ShotPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ShotPool {
    pub fn new() -> Self {
        Self {
            matrices: vec![0.0; MATRIX_STRIDE * MAX_SHOTS],
            records: vec![ShotRecord { ttl: -1.0, fired_by: None }; MAX_SHOTS],
        }
    }

    /// Fire from `world` (the ship transform) through the muzzle at
    /// `mount`, given in model units.
    ///
    /// Uses the first free slot of the shooter's half of the buffer. Returns
    /// `None` when that half is full.
    pub fn fire(&mut self, owner: ShipId, faction: Faction, world: &Mat4, mount: Vec3) -> Option<usize> {
        let start = faction.index() * SHOTS_PER_FACTION;
        let index = (start..start + SHOTS_PER_FACTION).find(|&i| !self.records[i].is_active())?;

        let muzzle = Vec3::new(mount.x, mount.y, mount.z + MUZZLE_FORWARD_NUDGE) * MOUNT_SCALE;
        let offset = world.transform_vector3(muzzle);
        let slot = &mut self.matrices[index * MATRIX_STRIDE..(index + 1) * MATRIX_STRIDE];
        world.write_cols_to_slice(slot);
        slot[12] += offset.x;
        slot[13] += offset.y;
        slot[14] += offset.z;

        self.records[index] = ShotRecord {
            ttl: SHOT_TTL_MS,
            fired_by: Some(owner),
        };
        Some(index)
    }

    /// Advance every live shot along its forward axis; shots hitting an
    /// asteroid or running out of time are freed and their matrix zeroed.
    pub fn tick(&mut self, dt: f32, field: &AsteroidField, asteroid_radius: f32) {
        for (index, record) in self.records.iter_mut().enumerate() {
            let m = &mut self.matrices[index * MATRIX_STRIDE..(index + 1) * MATRIX_STRIDE];
            if record.ttl > 0.0 {
                m[12] += m[8] * SHOT_SPEED * dt;
                m[13] += m[9] * SHOT_SPEED * dt;
                m[14] += m[10] * SHOT_SPEED * dt;
                record.ttl -= dt;
                if field.collide(Vec3::new(m[12], m[13], m[14]), asteroid_radius) {
                    record.ttl = -1.0;
                }
            } else {
                m.fill(0.0);
            }
        }
    }

    #[inline]
    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * MATRIX_STRIDE;
        Vec3::new(
            self.matrices[base + 12],
            self.matrices[base + 13],
            self.matrices[base + 14],
        )
    }

    #[inline]
    pub fn records(&self) -> &[ShotRecord] {
        &self.records
    }

    /// Free slot `index` without touching its matrix; the next tick zeroes it.
    #[inline]
    pub fn kill(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.ttl = -1.0;
        }
    }

    /// Forget `owner` on every shot it fired.
    pub fn clear_owner(&mut self, owner: ShipId) {
        for record in &mut self.records {
            if record.fired_by == Some(owner) {
                record.fired_by = None;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_active()).count()
    }

    /// Flat instance buffer, 16 floats per slot
    #[inline]
    pub fn matrix_data(&self) -> &[f32] {
        &self.matrices
    }

    /// Overwrite both halves of every slot, used by replay.
    pub fn restore(&mut self, matrices: &[f32], records: &[ShotRecord]) {
        self.matrices.copy_from_slice(matrices);
        self.records.copy_from_slice(records);
    }

    /// Replay blend: records from the earlier frame, matrices interpolated
    /// component-wise.
    pub fn restore_blend(&mut self, from: &[f32], to: &[f32], records: &[ShotRecord], t: f32) {
        for ((dst, a), b) in self.matrices.iter_mut().zip(from).zip(to) {
            *dst = a + (b - a) * t;
        }
        self.records.copy_from_slice(records);
    }
}
