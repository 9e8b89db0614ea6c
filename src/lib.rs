//! Space Pirates combat simulation
//!
//! Deterministic, frame-driven core of a 3D space dogfight: ship flight,
//! AI pilots, pooled weapons and effects, collisions, and a frame recorder
//! for replays. Rendering and audio are left to the host, which reads the
//! per-frame [`SimEvent`](game::events::SimEvent)s.

pub mod config;
pub mod game;
pub mod input;
pub mod util;
