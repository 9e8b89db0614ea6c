//! Steerable frame shared by ships and missiles

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::util::math::{world_matrix, Basis};

/// Per-frame control requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipInput {
    /// Horizontal steering delta (yaw)
    pub dx: f32,
    /// Vertical steering delta (pitch)
    pub dy: f32,
    pub shooting: bool,
    pub launch_missile: bool,
    pub burst: bool,
    pub brake: bool,
    pub immelmann: bool,
}

impl ShipInput {
    /// Clamp both steering axes to `±turn_rate`.
    #[inline]
    pub fn constrain(&mut self, turn_rate: f32) {
        let rate = turn_rate.abs();
        self.dx = self.dx.clamp(-rate, rate);
        self.dy = self.dy.clamp(-rate, rate);
    }

    /// Clear the button requests, keeping the steering axes.
    #[inline]
    pub fn clear_actions(&mut self) {
        self.shooting = false;
        self.launch_missile = false;
        self.burst = false;
        self.brake = false;
        self.immelmann = false;
    }
}

/// Position, orientation and local axes of a steerable entity
///
/// `rotation` is the transform the world sees; `orientation` is the steering
/// target that `rotation` converges to.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    pub rotation: Quat,
    pub orientation: Quat,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub input: ShipInput,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl Agent {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        let basis = Basis::from_rotation(rotation);
        Self {
            position,
            rotation,
            orientation: rotation,
            right: basis.right,
            up: basis.up,
            forward: basis.forward,
            input: ShipInput::default(),
        }
    }

    /// Place the agent and snap both rotations.
    pub fn set_position_orientation(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
        self.orientation = rotation;
        self.refresh_basis();
    }

    /// Recompute right/up/forward from the current world rotation.
    #[inline]
    pub fn refresh_basis(&mut self) {
        let basis = Basis::from_rotation(self.rotation);
        self.right = basis.right;
        self.up = basis.up;
        self.forward = basis.forward;
    }

    #[inline]
    pub fn world_matrix(&self) -> glam::Mat4 {
        world_matrix(self.position, self.rotation)
    }

    /// Alignment of the forward axis with the direction to `point`.
    #[inline]
    pub fn dot_to(&self, point: Vec3) -> f32 {
        self.forward.dot((point - self.position).normalize_or_zero())
    }

    /// Write steering that turns toward `aim` into `input.dx`/`input.dy`.
    ///
    /// Returns the alignment of the forward axis with the aim direction.
    pub fn go_toward(&mut self, aim: Vec3, turn_ratio: f32) -> f32 {
        let dif = (aim - self.position).normalize_or_zero();
        self.input.dx = dif.dot(self.right) * turn_ratio;
        self.input.dy = -dif.dot(self.up) * turn_ratio;
        dif.dot(self.forward)
    }
}
