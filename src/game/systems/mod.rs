//! Per-frame systems
//!
//! Free functions over [`SimState`](crate::game::state::SimState), called by
//! the session in a fixed order. Every system receives the frame's
//! [`TickContext`] instead of reaching for global state.

pub mod ai;
pub mod collision;
pub mod flight;
pub mod projectile;
pub mod ships;
pub mod targeting;

use crate::game::definition::GameDefinition;
use crate::game::tunables::Tunables;

/// Read-only frame parameters shared by every system
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub tunables: &'a Tunables,
    pub definition: &'a GameDefinition,
    /// Scaled frame delta in milliseconds
    pub dt: f32,
    /// Smoothed time scale
    pub game_speed: f32,
    /// Time scale the session is blending toward
    pub target_speed: f32,
    /// Global cannon cadence allows a shot this frame
    pub can_shoot: bool,
}

impl<'a> TickContext<'a> {
    pub fn new(tunables: &'a Tunables, definition: &'a GameDefinition, dt: f32) -> Self {
        Self {
            tunables,
            definition,
            dt,
            game_speed: 1.0,
            target_speed: 1.0,
            can_shoot: true,
        }
    }

    /// Playing at full speed: trails are extended and advanced
    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.target_speed == 1.0
    }
}
