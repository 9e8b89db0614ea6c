//! Events emitted by a simulation frame
//!
//! The core never talks to audio or rendering directly; hosts drain these
//! after each frame.

use glam::Vec3;
use smallvec::SmallVec;

use crate::game::match_result::Outcome;
use crate::game::ship::ShipId;

/// Fire-and-forget audio requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundCue {
    Laser { ship: ShipId },
    MissileLaunch { ship: ShipId },
    Explosion { position: Vec3 },
    Impact { ship: ShipId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    ShotFired {
        ship: ShipId,
        slot: usize,
    },
    MissileLaunched {
        ship: ShipId,
        target: ShipId,
        slot: usize,
    },
    ShipHit {
        ship: ShipId,
        attacker: Option<ShipId>,
        damage: f32,
    },
    ShipDestroyed {
        ship: ShipId,
        killer: Option<ShipId>,
        crashed: bool,
    },
    MissileDetonated {
        slot: usize,
        position: Vec3,
    },
    /// The instanced shot matrices changed and should be uploaded
    ShotBufferUpdated,
    PlaybackFinished,
    GameOver {
        outcome: Outcome,
    },
    Sound(SoundCue),
}

/// Events of one frame; spills to the heap only in heavy fights
pub type EventQueue = SmallVec<[SimEvent; 16]>;
