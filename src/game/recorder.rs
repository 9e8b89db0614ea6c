//! Battle recorder
//!
//! Captures a deep snapshot of every pooled entity each frame into a ring of
//! [`RecordFrame`]s, and plays them back at any speed. Speed 1 restores
//! frames exactly; other speeds interpolate between the two frames around
//! the playback cursor.
//!
//! Frame numbers used by [`Recorder::apply_frame`] are relative to the
//! oldest frame still stored, so frame 0 is always the oldest one.

use glam::{Quat, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use crate::game::effects::EffectPool;
use crate::game::events::SimEvent;
use crate::game::shot::ShotRecord;
use crate::game::state::SimState;

/// Trails whose side matches this mask are shown during replay
pub const DEFAULT_TRAIL_MASK: u8 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecorderError {
    #[error("cannot seek while recording")]
    RecordingActive,
    #[error("no frame recorded")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailFrame {
    pub color: [f32; 3],
    pub alpha: f32,
    pub side: u8,
}

/// Deep copy of everything a replay needs to redraw one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordFrame {
    pub ships: Vec<ShipFrame>,
    pub explosions: Vec<TimedFrame>,
    pub sparks: Vec<TimedFrame>,
    pub missiles: Vec<TimedFrame>,
    pub trails: Vec<TrailFrame>,
    pub trail_data: Vec<f32>,
    pub trail_cursor: usize,
    pub shot_matrices: Vec<f32>,
    pub shot_records: Vec<ShotRecord>,
}

fn capture_effects(into: &mut Vec<TimedFrame>, pool: &EffectPool) {
    into.clear();
    into.extend(pool.as_slice().iter().map(|e| TimedFrame {
        position: e.position,
        rotation: e.rotation,
        time: e.time,
    }));
}

fn blend_timed(a: &TimedFrame, b: &TimedFrame, t: f32) -> TimedFrame {
    TimedFrame {
        position: a.position.lerp(b.position, t),
        rotation: a.rotation.slerp(b.rotation, t),
        time: a.time + (b.time - a.time) * t,
    }
}

impl RecordFrame {
    pub fn capture(state: &SimState) -> Self {
        let mut frame = Self::default();
        frame.store(state);
        frame
    }

    /// Overwrite this frame with the current state, reusing its buffers.
    pub fn store(&mut self, state: &SimState) {
        self.ships.clear();
        self.ships.extend(state.ships.iter().map(|s| ShipFrame {
            position: s.position(),
            rotation: s.agent.rotation,
            enabled: s.is_valid(),
        }));
        capture_effects(&mut self.explosions, &state.explosions);
        capture_effects(&mut self.sparks, &state.sparks);
        self.missiles.clear();
        self.missiles.extend(state.missiles.as_slice().iter().map(|m| TimedFrame {
            position: m.position(),
            rotation: m.agent.rotation,
            time: m.time,
        }));
        self.trails.clear();
        self.trails.extend(state.trails.as_slice().iter().map(|t| TrailFrame {
            color: t.color,
            alpha: t.alpha,
            side: t.side,
        }));
        self.trail_data.clear();
        self.trail_data.extend_from_slice(state.trails.data());
        self.trail_cursor = state.trails.cursor();
        self.shot_matrices.clear();
        self.shot_matrices.extend_from_slice(state.shots.matrix_data());
        self.shot_records.clear();
        self.shot_records.extend_from_slice(state.shots.records());
    }

    /// Put the state back exactly as captured.
    pub fn restore(&self, state: &mut SimState, trail_mask: u8) {
        for (ship, frame) in state.ships.iter_mut().zip(&self.ships) {
            ship.agent.position = frame.position;
            ship.agent.rotation = frame.rotation;
            ship.agent.refresh_basis();
            ship.visible = frame.enabled;
        }
        for (i, e) in self.explosions.iter().enumerate() {
            state.explosions.restore(i, e.position, e.rotation, e.time);
        }
        for (i, e) in self.sparks.iter().enumerate() {
            state.sparks.restore(i, e.position, e.rotation, e.time);
        }
        for (missile, frame) in state.missiles.as_mut_slice().iter_mut().zip(&self.missiles) {
            missile.agent.set_position_orientation(frame.position, frame.rotation);
            missile.time = frame.time;
        }
        self.restore_trails(state, trail_mask);
        state.shots.restore(&self.shot_matrices, &self.shot_records);
    }

    /// Interpolate between this frame and `next`. Discrete data (ship
    /// visibility, trails, shot ownership) comes from this frame.
    pub fn restore_blend(&self, state: &mut SimState, next: &RecordFrame, trail_mask: u8, t: f32) {
        for ((ship, a), b) in state.ships.iter_mut().zip(&self.ships).zip(&next.ships) {
            ship.agent.position = a.position.lerp(b.position, t);
            ship.agent.rotation = a.rotation.slerp(b.rotation, t);
            ship.agent.refresh_basis();
            ship.visible = a.enabled;
        }
        for (i, (a, b)) in self.explosions.iter().zip(&next.explosions).enumerate() {
            let e = blend_timed(a, b, t);
            state.explosions.restore(i, e.position, e.rotation, e.time);
        }
        for (i, (a, b)) in self.sparks.iter().zip(&next.sparks).enumerate() {
            let e = blend_timed(a, b, t);
            state.sparks.restore(i, e.position, e.rotation, e.time);
        }
        let missiles = state.missiles.as_mut_slice().iter_mut();
        for ((missile, a), b) in missiles.zip(&self.missiles).zip(&next.missiles) {
            let m = blend_timed(a, b, t);
            missile.agent.set_position_orientation(m.position, m.rotation);
            missile.time = m.time;
        }
        self.restore_trails(state, trail_mask);
        state
            .shots
            .restore_blend(&self.shot_matrices, &next.shot_matrices, &self.shot_records, t);
    }

    fn restore_trails(&self, state: &mut SimState, trail_mask: u8) {
        if self.trail_data.len() == state.trails.data().len() {
            state.trails.restore_samples(&self.trail_data, self.trail_cursor);
        }
        for (i, trail) in self.trails.iter().enumerate() {
            state
                .trails
                .restore_params(i, trail.color, trail.alpha, trail.side & trail_mask != 0);
        }
    }
}

/// Called once when a playback reaches the last frame
pub type PlaybackDone = Box<dyn FnOnce()>;

pub struct Recorder {
    record_active: bool,
    capacity: usize,
    head: usize,
    available: usize,
    frames: Vec<RecordFrame>,
    playback_frame: f32,
    playback_speed: f32,
    playing_back: bool,
    when_done: Option<PlaybackDone>,
    trail_mask: u8,
    last_frame: Option<usize>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("record_active", &self.record_active)
            .field("capacity", &self.capacity)
            .field("head", &self.head)
            .field("available", &self.available)
            .field("playback_frame", &self.playback_frame)
            .field("playback_speed", &self.playback_speed)
            .field("playing_back", &self.playing_back)
            .finish()
    }
}

impl Recorder {
    /// Recorder holding at most `capacity` frames; starts idle.
    pub fn new(capacity: usize) -> Self {
        Self {
            record_active: false,
            capacity,
            head: 0,
            available: 0,
            frames: Vec::with_capacity(capacity),
            playback_frame: 0.0,
            playback_speed: 0.0,
            playing_back: false,
            when_done: None,
            trail_mask: DEFAULT_TRAIL_MASK,
            last_frame: None,
        }
    }

    pub fn set_record_active(&mut self, active: bool) {
        self.record_active = active;
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.record_active
    }

    #[inline]
    pub fn is_playing_back(&self) -> bool {
        self.playing_back
    }

    #[inline]
    pub fn available_frames(&self) -> usize {
        self.available
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replay cursor, in frames from the oldest stored frame
    #[inline]
    pub fn playback_position(&self) -> f32 {
        self.playback_frame
    }

    pub fn set_trail_mask(&mut self, mask: u8) {
        self.trail_mask = mask;
    }

    /// Storage slot of the `index`-th oldest frame
    pub fn effective_index(&self, index: usize) -> Option<usize> {
        if self.available == 0 || self.capacity == 0 {
            return None;
        }
        let tail = self.head.saturating_sub(self.capacity) % self.capacity;
        Some((tail + index) % self.available)
    }

    /// Record the current frame, or advance the playback.
    pub fn tick(&mut self, state: &mut SimState) {
        if !self.record_active {
            if self.playing_back {
                self.advance_playback(state);
            }
            return;
        }
        if self.capacity == 0 {
            return;
        }
        if self.frames.len() < self.capacity {
            self.frames.push(RecordFrame::capture(state));
        } else {
            let slot = self.head % self.capacity;
            self.frames[slot].store(state);
        }
        self.head += 1;
        self.available = self.head.min(self.capacity);
    }

    fn advance_playback(&mut self, state: &mut SimState) {
        self.playback_frame += self.playback_speed;
        if self.playback_frame >= self.available as f32 {
            self.playing_back = false;
            info!("Playback finished after {} frames", self.available);
            state.emit(SimEvent::PlaybackFinished);
            if let Some(done) = self.when_done.take() {
                done();
            }
            return;
        }

        let floor = self.playback_frame.floor().max(0.0) as usize;
        let Some(current) = self.effective_index(floor) else {
            return;
        };
        if self.playback_speed == 1.0 {
            self.frames[current].restore(state, self.trail_mask);
        } else {
            let next = (floor + 1).min(self.available - 1);
            let Some(next) = self.effective_index(next) else {
                return;
            };
            let t = self.playback_frame - self.playback_frame.floor();
            self.frames[current].restore_blend(state, &self.frames[next], self.trail_mask, t);
        }
    }

    /// Seek: restore the `index`-th oldest frame.
    pub fn apply_frame(&mut self, index: usize, state: &mut SimState) -> Result<(), RecorderError> {
        if self.record_active {
            return Err(RecorderError::RecordingActive);
        }
        let slot = self.effective_index(index).ok_or(RecorderError::Empty)?;
        self.last_frame = Some(index);
        self.frames[slot].restore(state, self.trail_mask);
        Ok(())
    }

    /// Restore the frame picked by the last seek again.
    pub fn refresh_frame(&mut self, state: &mut SimState) -> Result<(), RecorderError> {
        match self.last_frame {
            Some(index) => self.apply_frame(index, state),
            None => Ok(()),
        }
    }

    /// Start replaying from the oldest frame at `speed` frames per tick.
    pub fn playback(&mut self, speed: f32, when_done: Option<PlaybackDone>) {
        info!("Playback of {} frames at speed {}", self.available, speed);
        self.playback_frame = 0.0;
        self.playback_speed = speed;
        self.playing_back = true;
        self.when_done = when_done;
    }

    pub fn stop(&mut self) {
        if self.playing_back {
            debug!("Playback stopped at frame {}", self.playback_frame);
        }
        self.playing_back = false;
    }
}
