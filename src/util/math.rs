//! 3D math helpers on top of glam
//!
//! All transforms use the left-handed, +Z-forward convention: the world
//! matrix columns are (right, up, forward, translation), which is also the
//! layout of the instanced shot buffer.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Local axes of a rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Basis {
    #[inline]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
            forward: rotation * Vec3::Z,
        }
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::from_rotation(Quat::IDENTITY)
    }
}

/// Rotation of `angle` radians around `axis`. A degenerate axis yields identity.
#[inline]
pub fn rotation_axis(axis: Vec3, angle: f32) -> Quat {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle),
        None => Quat::IDENTITY,
    }
}

/// Yaw around world up by `dx`, then pitch around the yawed right axis by `dy`.
///
/// Returns the pair `(rx, ry)` so callers can compose `orientation * rx * ry`.
#[inline]
pub fn steering_rotations(dx: f32, dy: f32) -> (Quat, Quat) {
    let rx = rotation_axis(Vec3::Y, dx);
    let right = rx * Vec3::X;
    let ry = rotation_axis(right, dy);
    (rx, ry)
}

/// Euler angles (pitch x, yaw y, roll z) applied yaw, pitch, roll.
#[inline]
pub fn quat_from_euler(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(glam::EulerRot::YXZ, y, x, z)
}

#[inline]
pub fn world_matrix(position: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_rotation_translation(rotation, position)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Squared-distance sphere test, `true` when `a` and `b` are closer than `radius`.
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    radius > 0.0 && a.distance_squared(b) < radius * radius
}

/// Transform a world point through view and projection and test it against
/// the central half of the screen.
pub fn project_inside_view(point: Vec3, view: &Mat4, projection: &Mat4) -> bool {
    let eye = view.transform_point3(point);
    let clip: Vec4 = *projection * eye.extend(1.0);
    if clip.w.abs() <= f32::EPSILON {
        return false;
    }
    let x = clip.x / clip.w;
    let y = clip.y / clip.w;
    x.abs() < 0.5 && y.abs() < 0.5 && clip.z > 0.0
}
