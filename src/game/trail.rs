//! Trail ribbons
//!
//! All trails share one sample buffer of `capacity * 256` (x, y, z, w)
//! samples and one write cursor. Each frame every trail copies its newest
//! sample to the shared cursor, then the cursor advances, so a ribbon always
//! holds the last 256 positions of its owner.

use glam::Vec3;

use crate::game::constants::trail::{
    ALPHA_EPSILON, FADE_RATE, SAMPLE_STRIDE, SPAWN_JITTER, TRAIL_LENGTH,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    pub color: [f32; 3],
    pub alpha: f32,
    /// Bit mask matched against the replay visibility mask
    pub side: u8,
    pub visible: bool,
    /// Owner still attached; released trails fade out
    attached: bool,
    cursor: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self {
            color: [0.0; 3],
            alpha: 0.0,
            side: 0,
            visible: false,
            attached: false,
            cursor: 0,
        }
    }
}

impl Trail {
    /// In use or still fading
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.attached || self.alpha > ALPHA_EPSILON
    }

    /// Drawn this frame
    #[inline]
    pub fn is_shown(&self) -> bool {
        self.is_valid() && self.visible
    }
}

#[derive(Debug, Clone)]
pub struct TrailPool {
    trails: Vec<Trail>,
    data: Vec<f32>,
    cursor: usize,
}

impl TrailPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: vec![Trail::default(); capacity],
            data: vec![0.0; capacity * TRAIL_LENGTH * SAMPLE_STRIDE],
            cursor: TRAIL_LENGTH - 1,
        }
    }

    #[inline]
    fn sample_offset(trail: usize, sample: usize) -> usize {
        (trail * TRAIL_LENGTH + sample) * SAMPLE_STRIDE
    }

    /// Claim the first free ribbon and collapse it onto `position`.
    pub fn spawn(&mut self, position: Vec3, side: u8, color: [f32; 3]) -> Option<usize> {
        let index = self.trails.iter().position(|t| !t.is_valid())?;
        for i in 0..TRAIL_LENGTH {
            let o = Self::sample_offset(index, i);
            self.data[o] = position.x;
            self.data[o + 1] = position.y;
            self.data[o + 2] = position.z + (i as f32 - TRAIL_LENGTH as f32) * SPAWN_JITTER;
            self.data[o + 3] = 0.0;
        }
        let trail = &mut self.trails[index];
        trail.attached = true;
        trail.alpha = 1.0;
        trail.side = side;
        trail.color = color;
        trail.visible = true;
        Some(index)
    }

    /// Write the owner's current position as the ribbon head.
    pub fn append(&mut self, index: usize, position: Vec3) {
        let Some(trail) = self.trails.get(index) else {
            return;
        };
        let o = Self::sample_offset(index, trail.cursor);
        self.data[o] = position.x;
        self.data[o + 1] = position.y;
        self.data[o + 2] = position.z;
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(trail) = self.trails.get_mut(index) {
            trail.visible = visible;
        }
    }

    /// Detach the owner; the ribbon fades out over the next frames.
    pub fn release(&mut self, index: usize) {
        if let Some(trail) = self.trails.get_mut(index) {
            trail.attached = false;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let cursor = self.cursor;
        for (index, trail) in self.trails.iter_mut().enumerate() {
            let from = Self::sample_offset(index, trail.cursor);
            let to = Self::sample_offset(index, cursor);
            self.data.copy_within(from..from + 3, to);
            trail.cursor = cursor;
            if !trail.attached {
                trail.alpha = (trail.alpha - dt * FADE_RATE).max(0.0);
            }
        }
        self.cursor = (self.cursor + 1) % TRAIL_LENGTH;
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn as_slice(&self) -> &[Trail] {
        &self.trails
    }

    pub fn get(&self, index: usize) -> Option<&Trail> {
        self.trails.get(index)
    }

    pub fn valid_count(&self) -> usize {
        self.trails.iter().filter(|t| t.is_valid()).count()
    }

    /// Replay: restore buffer contents and the shared cursor.
    pub fn restore_samples(&mut self, data: &[f32], cursor: usize) {
        self.data.copy_from_slice(data);
        self.cursor = cursor;
        for trail in &mut self.trails {
            trail.cursor = cursor;
        }
    }

    /// Replay: restore presentation parameters of one ribbon.
    pub fn restore_params(&mut self, index: usize, color: [f32; 3], alpha: f32, visible: bool) {
        if let Some(trail) = self.trails.get_mut(index) {
            trail.color = color;
            trail.alpha = alpha;
            trail.visible = visible;
        }
    }
}
