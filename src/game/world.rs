//! Asteroid field
//!
//! Each asteroid is a cluster of sub-spheres. Queries first test the
//! cluster's enclosing sphere and only walk the sub-spheres when that coarse
//! test hits.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::game::constants::asteroids::{
    AVOID_FACTOR, COARSE_FACTOR, ENCLOSING_FACTOR, SCALE, SUB_SPHERES,
};
use crate::util::math::{quat_from_euler, within_radius};

/// Bounding sphere of one asteroid chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Chunk layout shared by every asteroid, in model units
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidTemplate {
    pub parts: Vec<SubSphere>,
}

impl Default for AsteroidTemplate {
    fn default() -> Self {
        let parts = (0..SUB_SPHERES)
            .map(|i| {
                let angle = i as f32 / SUB_SPHERES as f32 * std::f32::consts::TAU;
                SubSphere {
                    center: Vec3::new(angle.cos() * 0.25, (i as f32 - 2.5) * 0.06, angle.sin() * 0.25),
                    radius: 0.3 + (i % 3) as f32 * 0.05,
                }
            })
            .collect();
        Self { parts }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    /// Centroid of the sub-sphere centres
    pub center: Vec3,
    /// Enclosing radius, farthest sub-sphere centre times the fudge factor
    pub radius: f32,
    pub parts: Vec<SubSphere>,
}

impl Asteroid {
    /// Build from world-space sub-spheres.
    pub fn from_parts(parts: Vec<SubSphere>) -> Self {
        let center = if parts.is_empty() {
            Vec3::ZERO
        } else {
            parts.iter().map(|p| p.center).sum::<Vec3>() / parts.len() as f32
        };
        let farthest = parts
            .iter()
            .map(|p| center.distance(p.center))
            .fold(0.0_f32, f32::max);
        Self {
            center,
            radius: farthest * ENCLOSING_FACTOR,
            parts,
        }
    }

    /// Place `template` at `position` with `rotation` and uniform `scale`.
    pub fn from_template(template: &AsteroidTemplate, position: Vec3, rotation: Quat, scale: f32) -> Self {
        let parts = template
            .parts
            .iter()
            .map(|p| SubSphere {
                center: position + rotation * (p.center * scale),
                radius: p.radius * scale,
            })
            .collect();
        Self::from_parts(parts)
    }

    fn collides(&self, position: Vec3, radius: f32) -> bool {
        if !within_radius(position, self.center, radius + self.radius * COARSE_FACTOR) {
            return false;
        }
        self.parts
            .iter()
            .any(|p| within_radius(position, p.center, radius + p.radius * COARSE_FACTOR))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsteroidField {
    asteroids: Vec<Asteroid>,
}

impl AsteroidField {
    pub fn new(asteroids: Vec<Asteroid>) -> Self {
        Self { asteroids }
    }

    /// Scatter `count` asteroids uniformly in a cube of edge `extent`
    /// centred on the origin.
    pub fn generate<R: Rng>(rng: &mut R, template: &AsteroidTemplate, count: u32, extent: f32) -> Self {
        let mut asteroids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut axis = || rng.gen::<f32>() * extent - extent * 0.5;
            let position = Vec3::new(axis(), axis(), axis());
            let mut angle = || rng.gen::<f32>() * std::f32::consts::TAU;
            let rotation = quat_from_euler(angle(), angle(), angle());
            asteroids.push(Asteroid::from_template(template, position, rotation, SCALE));
        }
        Self { asteroids }
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }

    /// `true` when a sphere at `position` overlaps any asteroid chunk.
    pub fn collide(&self, position: Vec3, radius: f32) -> bool {
        self.asteroids.iter().any(|a| a.collides(position, radius))
    }

    /// Escape point for a sphere that came too close to an asteroid.
    ///
    /// Uses the first asteroid whose avoidance shell contains the sphere. A
    /// sphere sitting exactly on the centre escapes upward.
    pub fn should_avoid(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        self.asteroids.iter().find_map(|a| {
            let shell = radius + a.radius * AVOID_FACTOR;
            if !within_radius(position, a.center, shell) {
                return None;
            }
            let delta = position.distance(a.center) - shell;
            let away = (position - a.center).try_normalize().unwrap_or(Vec3::Y);
            Some(position + away * -delta)
        })
    }

    /// Drop every asteroid overlapping the sphere, returns how many went.
    pub fn remove_near(&mut self, position: Vec3, radius: f32) -> usize {
        let before = self.asteroids.len();
        self.asteroids
            .retain(|a| !within_radius(position, a.center, radius + a.radius));
        before - self.asteroids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single_rock() -> AsteroidField {
        // Two chunks 20 units apart: centroid at origin, enclosing radius 40
        AsteroidField::new(vec![Asteroid::from_parts(vec![
            SubSphere { center: Vec3::new(-10.0, 0.0, 0.0), radius: 4.0 },
            SubSphere { center: Vec3::new(10.0, 0.0, 0.0), radius: 4.0 },
        ])])
    }

    #[test]
    fn test_enclosing_sphere() {
        let field = single_rock();
        let rock = &field.asteroids()[0];
        assert_eq!(rock.center, Vec3::ZERO);
        assert_eq!(rock.radius, 40.0);
    }

    #[test]
    fn test_coarse_miss() {
        let field = single_rock();
        assert!(!field.collide(Vec3::new(0.0, 0.0, 25.0), 1.0));
    }

    #[test]
    fn test_coarse_hit_fine_miss() {
        // Inside the coarse shell (radius 21) but between the two chunks
        let field = single_rock();
        assert!(!field.collide(Vec3::new(0.0, 0.0, 5.0), 1.0));
    }

    #[test]
    fn test_fine_hit() {
        let field = single_rock();
        assert!(field.collide(Vec3::new(10.0, 0.0, 2.0), 1.0));
    }

    #[test]
    fn test_should_avoid_points_away() {
        let field = single_rock();
        let p = Vec3::new(0.0, 0.0, 50.0);
        let avoid = field.should_avoid(p, 1.0).unwrap();
        // Shell radius 81, so the point is pushed 31 units further out
        assert!((avoid - Vec3::new(0.0, 0.0, 81.0)).length() < 1e-3);
        assert!(field.should_avoid(Vec3::new(0.0, 0.0, 200.0), 1.0).is_none());
    }

    #[test]
    fn test_should_avoid_at_centre_is_finite() {
        let field = single_rock();
        let avoid = field.should_avoid(Vec3::ZERO, 1.0).unwrap();
        assert!(avoid.is_finite());
        assert!(avoid.y > 0.0);
    }

    #[test]
    fn test_remove_near() {
        let mut field = single_rock();
        assert_eq!(field.remove_near(Vec3::new(0.0, 0.0, 500.0), 50.0), 0);
        assert_eq!(field.remove_near(Vec3::new(0.0, 0.0, 80.0), 50.0), 1);
        assert!(field.is_empty());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let template = AsteroidTemplate::default();
        let a = AsteroidField::generate(&mut StdRng::seed_from_u64(2022), &template, 5, 1000.0);
        let b = AsteroidField::generate(&mut StdRng::seed_from_u64(2022), &template, 5, 1000.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        for rock in a.asteroids() {
            assert!(rock.center.abs().max_element() < 600.0);
            assert!(rock.radius > 0.0);
        }
    }
}
