//! Fixed simulation constants
//!
//! Values that are not exposed through the tunables table. Times are in
//! milliseconds, distances in world units, velocities in units per frame.

/// Pool capacities
pub mod pool {
    /// Shot slots, split evenly between the two factions
    pub const MAX_SHOTS: usize = 200;
    /// Shot slots reserved for each faction
    pub const SHOTS_PER_FACTION: usize = MAX_SHOTS / 2;
    /// Missile slots
    pub const MAX_MISSILES: usize = 10;
    /// Explosion effect slots
    pub const MAX_EXPLOSIONS: usize = 4;
    /// Spark burst slots
    pub const MAX_SPARKS: usize = 30;
    /// Floats per shot matrix
    pub const MATRIX_STRIDE: usize = 16;
}

/// Global frame pacing
pub mod pacing {
    /// Blend factor applied each frame to move game speed toward the target speed
    pub const SPEED_BLEND: f32 = 0.1;
    /// Ship updates are skipped while the game speed is at or below this value
    pub const FROZEN_SPEED: f32 = 0.001;
    /// Minimum interval between two cannon shots (shared by every ship)
    pub const SHOOT_INTERVAL_MS: f32 = 130.0;
    /// Frame deltas at or below this value do not fire weapons or extend trails
    pub const MIN_ACTIVE_DT: f32 = 0.001;
}

/// Ship flight model
pub mod flight {
    /// Rendered rotation catches up with the steering orientation by this factor per frame
    pub const ROTATION_SMOOTHING: f32 = 0.05;
    /// Acceleration multiplier applied to `maxAccel`
    pub const ACCEL_SCALE: f32 = 8.0;
    /// Speed ratio the ship settles at when neither burst nor brake is held
    pub const CRUISE_RATIO: f32 = 0.5;
    /// Velocity multiplier while braking
    pub const BRAKE_DAMPING: f32 = 0.98;
    /// Afterburner level bounds
    pub const MAX_BURSTING: f32 = 2.0;
    /// Afterburner level change per millisecond
    pub const BURSTING_RATE: f32 = 0.001;
    /// Afterburner decay per frame when idle
    pub const BURSTING_DECAY: f32 = 0.98;
    /// Visual roll follows dx with this factor
    pub const ROLL_FOLLOW: f32 = 0.01;
    /// Fraction of the Immelmann window spent pitching
    pub const IMMELMANN_PITCH_PHASE: f32 = 0.4;
    /// Pitch request added each frame during the Immelmann pitch phase
    pub const IMMELMANN_PITCH: f32 = 0.12;
    /// Roll amplitude while leaving an Immelmann
    pub const IMMELMANN_ROLL: f32 = 0.2;
}

/// Weapons
pub mod weapons {
    use glam::Vec3;

    /// Shot lifetime
    pub const SHOT_TTL_MS: f32 = 5000.0;
    /// Shot speed in units per millisecond
    pub const SHOT_SPEED: f32 = 0.5;
    /// Muzzle offsets are authored in model units and scaled to world units
    pub const MOUNT_SCALE: f32 = 25.0;
    /// Forward nudge applied to the muzzle before scaling
    pub const MUZZLE_FORWARD_NUDGE: f32 = 0.2;
    /// Left and right cannon mounts per faction, in model units
    pub const CANNON_MOUNTS: [[Vec3; 2]; 2] = [
        [Vec3::new(-0.11, -0.01, 0.12), Vec3::new(0.11, -0.01, 0.12)],
        [Vec3::new(-0.09, 0.02, 0.16), Vec3::new(0.09, 0.02, 0.16)],
    ];
    /// Missiles carried by each faction at spawn
    pub const MISSILE_LOADOUT: [u32; 2] = [8, 0];
    /// Under-wing missile pylons in model units, consumed from the last one
    pub const MISSILE_MOUNTS: [Vec3; 8] = [
        Vec3::new(-0.05, -0.03, 0.0),
        Vec3::new(0.05, -0.03, 0.0),
        Vec3::new(-0.1, -0.03, -0.01),
        Vec3::new(0.1, -0.03, -0.01),
        Vec3::new(-0.15, -0.02, -0.02),
        Vec3::new(0.15, -0.02, -0.02),
        Vec3::new(-0.2, -0.02, -0.03),
        Vec3::new(0.2, -0.02, -0.03),
    ];
    /// Missile lifetime
    pub const MISSILE_MAX_LIFE_MS: f32 = 10_000.0;
    /// Time value of a missile slot that was never launched
    pub const MISSILE_IDLE_TIME: f32 = 99_999.0;
    /// Missile speed in units per millisecond
    pub const MISSILE_SPEED: f32 = 0.15;
    /// Missile turn ratio grows with `time / MISSILE_TURN_RAMP`
    pub const MISSILE_TURN_RAMP: f32 = 100_000.0;
    /// Upper bound of the missile turn ratio
    pub const MISSILE_MAX_TURN: f32 = 0.05;
}

/// Collision thresholds
///
/// The squared thresholds are gameplay-tuned values, not derived from mesh
/// sizes.
pub mod collision {
    /// Shot vs ship, squared distance (inclusive)
    pub const SHOT_HIT_DIST_SQ: f32 = 36.0;
    /// Missile vs chased ship, squared distance (exclusive)
    pub const MISSILE_HIT_DIST_SQ: f32 = 200.0;
    /// Ship radius used against asteroids
    pub const SHIP_ASTEROID_RADIUS: f32 = 1.0;
    /// Shot radius used against asteroids
    pub const SHOT_ASTEROID_RADIUS: f32 = 6.0;
    /// Missile radius used against asteroids
    pub const MISSILE_ASTEROID_RADIUS: f32 = 0.5;
    /// Ship probe radius for asteroid avoidance
    pub const AVOID_PROBE_RADIUS: f32 = 1.0;
    /// Life assigned to a ship that hit an asteroid
    pub const CRASH_LIFE: f32 = -1.0;
}

/// AI steering constants that are not tunable
pub mod ai {
    /// Turn ratio used when steering away from asteroids or back home
    pub const AVOID_TURN_RATIO: f32 = 0.02;
    /// Wander oscillation frequency (radians per millisecond)
    pub const WANDER_FREQUENCY: f32 = 0.002;
    /// Distance of the evade point from the ship
    pub const EVADE_DISTANCE: f32 = 1000.0;
    /// Chase: brake when the enemy alignment drops below this dot
    pub const BRAKE_ALIGNMENT: f32 = 0.4;
    /// Chase: burst only when the enemy alignment exceeds this dot
    pub const BURST_ALIGNMENT: f32 = 0.8;
}

/// Effect lifetimes
pub mod effects {
    /// Explosion window, inclusive
    pub const EXPLOSION_LIFE_MS: f32 = 2000.0;
    /// Spark window, exclusive
    pub const SPARK_LIFE_MS: f32 = 1000.0;
    /// Time value of an effect slot that was never spawned
    pub const IDLE_TIME: f32 = 9999.0;
}

/// Trail ribbons
pub mod trail {
    /// Samples per trail ring
    pub const TRAIL_LENGTH: usize = 256;
    /// Floats per sample (x, y, z, w)
    pub const SAMPLE_STRIDE: usize = 4;
    /// Alpha lost per millisecond once a trail is released
    pub const FADE_RATE: f32 = 0.0003;
    /// Trails count as alive until their alpha drops below this value
    pub const ALPHA_EPSILON: f32 = 0.001;
    /// Depth jitter between freshly spawned samples, keeps the ribbon non-degenerate
    pub const SPAWN_JITTER: f32 = 0.00001;
    /// Side mask of faction 0 ship trails
    pub const SIDE_ALLIES: u8 = 1;
    /// Side mask of faction 1 ship trails
    pub const SIDE_ENEMIES: u8 = 2;
    /// Side mask of missile trails
    pub const SIDE_MISSILE: u8 = 3;
    /// Trail colours per faction
    pub const FACTION_COLORS: [[f32; 3]; 2] = [[0.64, 0.42, 0.15], [0.12, 0.56, 0.62]];
    /// Missile trail colour
    pub const MISSILE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
}

/// Fleet placement
pub mod spawn {
    /// Distance of both fleets from the origin along Z
    pub const FLEET_OFFSET_Z: f32 = 500.0;
    /// Spacing between human ships of the same fleet
    pub const HUMAN_SPACING: f32 = 50.0;
    /// Half-extent of the AI spawn scatter cube
    pub const AI_SCATTER: f32 = 50.0;
    /// Asteroids closer than this to a fleet origin are removed
    pub const CLEAR_RADIUS: f32 = 50.0;
}

/// Asteroid field generation
pub mod asteroids {
    /// Scale applied to the asteroid template
    pub const SCALE: f32 = 100.0;
    /// Enclosing sphere fudge factor over the farthest sub-sphere centre
    pub const ENCLOSING_FACTOR: f32 = 4.0;
    /// Sub-spheres per generated asteroid
    pub const SUB_SPHERES: usize = 6;
    /// Coarse test uses this fraction of the enclosing radius
    pub const COARSE_FACTOR: f32 = 0.5;
    /// Avoidance starts at this multiple of the enclosing radius
    pub const AVOID_FACTOR: f32 = 2.0;
}

/// Chase camera attached to human ships
pub mod camera {
    /// Base vertical field of view in radians
    pub const FOV: f32 = 0.8;
    /// Field of view lost per unit of afterburner
    pub const FOV_BURST: f32 = 0.1;
    /// Near clip plane distance
    pub const NEAR: f32 = 1.0;
    /// Far clip plane distance
    pub const FAR: f32 = 10_000.0;
    /// Width over height until the host reports a viewport
    pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;
    /// Eye follows the ship with this factor per frame
    pub const EYE_LERP: f32 = 0.1;
    /// Look target follows the ship with this factor per frame
    pub const TARGET_LERP: f32 = 0.15;
    /// Local-space offsets are scaled by this factor
    pub const RIG_SCALE: f32 = 5.0;
}
