//! Chase camera of a human ship
//!
//! Only the parts that matter to the simulation: where the camera sits and
//! whether a world point is inside the central part of its view, which
//! gates human target acquisition.

use glam::{Mat4, Vec3};

use crate::game::constants::camera::{
    DEFAULT_ASPECT, EYE_LERP, FAR, FOV, FOV_BURST, NEAR, RIG_SCALE, TARGET_LERP,
};
use crate::game::ship::Ship;
use crate::util::math::project_inside_view;

#[derive(Debug, Clone, PartialEq)]
pub struct ShipCamera {
    /// Eye offset from the ship, smoothed
    local_eye: Vec3,
    /// Look-at offset from the ship, smoothed
    local_target: Vec3,
    up: Vec3,
    ship_position: Vec3,
    fov: f32,
    aspect: f32,
}

impl ShipCamera {
    /// Camera placed behind `ship` without smoothing.
    pub fn follow(ship: &Ship, aspect: f32) -> Self {
        let (eye, target) = Self::rig(ship);
        Self {
            local_eye: eye,
            local_target: target,
            up: ship.agent.up,
            ship_position: ship.position(),
            fov: FOV - ship.bursting * FOV_BURST,
            aspect: if aspect > 0.0 { aspect } else { DEFAULT_ASPECT },
        }
    }

    /// Ideal eye and target offsets for the ship's current state.
    fn rig(ship: &Ship) -> (Vec3, Vec3) {
        let b = ship.bursting;
        let eye = Vec3::new(0.0, 0.8 + b.min(0.0) * 0.1, -2.5 - b.max(0.0)) * RIG_SCALE;
        let target = Vec3::new(0.0, 0.0, 100.0) * RIG_SCALE;
        (ship.agent.rotation * eye, ship.agent.rotation * target)
    }

    pub fn update(&mut self, ship: &Ship, game_speed: f32) {
        let (eye, target) = Self::rig(ship);
        self.local_eye = self.local_eye.lerp(eye, EYE_LERP * game_speed);
        self.local_target = self.local_target.lerp(target, TARGET_LERP * game_speed);
        self.up = ship.agent.up;
        self.ship_position = ship.position();
        self.fov = FOV - ship.bursting * FOV_BURST;
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.ship_position + self.local_eye
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.ship_position + self.local_target
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye(), self.target(), self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov, self.aspect, NEAR, FAR)
    }

    /// `true` when `point` projects into the central half of the screen in
    /// front of the camera.
    pub fn is_on_screen(&self, point: Vec3) -> bool {
        project_inside_view(point, &self.view_matrix(), &self.projection_matrix())
    }
}
