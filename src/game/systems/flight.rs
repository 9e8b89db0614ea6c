//! Flight model shared by human and AI ships
//!
//! Turns the steering requests left in [`ShipInput`] by the pilots into a
//! new orientation, speed and position, then fires the weapons.

use glam::{Mat4, Quat, Vec3};

use crate::game::agent::ShipInput;
use crate::game::constants::flight::{
    ACCEL_SCALE, BRAKE_DAMPING, BURSTING_DECAY, BURSTING_RATE, CRUISE_RATIO, IMMELMANN_PITCH,
    IMMELMANN_PITCH_PHASE, IMMELMANN_ROLL, MAX_BURSTING, ROLL_FOLLOW, ROTATION_SMOOTHING,
};
use crate::game::constants::pacing::MIN_ACTIVE_DT;
use crate::game::constants::trail::{MISSILE_COLOR, SIDE_MISSILE};
use crate::game::constants::weapons::{MISSILE_MOUNTS, MOUNT_SCALE};
use crate::game::events::{SimEvent, SoundCue};
use crate::game::ship::{Faction, Maneuver, Ship, ShipId};
use crate::game::state::SimState;
use crate::game::systems::TickContext;
use crate::game::tunables::Tunables;
use crate::util::math::steering_rotations;

struct CannonShot {
    world: Mat4,
    mount: Vec3,
    faction: Faction,
}

struct MissileLaunch {
    target: ShipId,
    position: Vec3,
    rotation: Quat,
}

/// Integrate one ship for one frame.
pub fn tick_generic(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let tunables = ctx.tunables;
    let Some(ship) = state.ships.get_mut(id) else {
        return;
    };

    // Shots leave from where the ship was at the start of the frame.
    ship.agent.refresh_basis();
    let world = ship.agent.world_matrix();
    let forward = ship.agent.forward;
    let mut input = ship.agent.input;

    advance_maneuver(ship, &mut input, tunables.immelmann_duration, ctx.dt);
    steer(ship, &mut input, tunables.immelmann_duration, ctx.game_speed);
    throttle(ship, &input, tunables);
    ship.agent.position += forward * ship.velocity * ctx.game_speed;

    let trail = ship.trail.filter(|_| ctx.is_realtime());
    let show_trail = !ship.is_human;
    let position = ship.agent.position;

    input.dx = 0.0;
    input.dy = 0.0;

    let mut cannon = None;
    if ctx.can_shoot && input.shooting && ctx.dt > MIN_ACTIVE_DT {
        if let Some(mounts) = ship.cannons {
            cannon = Some(CannonShot {
                world,
                mount: mounts[ship.cannon_index],
                faction: ship.faction,
            });
            ship.stats.shots_fired += 1;
            ship.cannon_index = (ship.cannon_index + 1) & 1;
        }
    }

    ship.missile_cooldown = (ship.missile_cooldown - ctx.dt).max(0.0);
    let mut launch = None;
    if let Some(target) = ship.best_prey {
        let locked = ship.best_prey_time > tunables.time_to_lock_missile;
        if locked && input.launch_missile && ship.missile_cooldown <= 0.0 {
            if ship.available_missiles > 0 {
                let pylon = MISSILE_MOUNTS[(ship.available_missiles as usize - 1) % MISSILE_MOUNTS.len()];
                launch = Some(MissileLaunch {
                    target,
                    position: position + ship.agent.rotation * (pylon * MOUNT_SCALE),
                    rotation: ship.agent.rotation,
                });
                ship.available_missiles -= 1;
                ship.stats.missiles_fired += 1;
            }
            ship.missile_cooldown = tunables.missile_cooldown_time;
        }
    }

    ship.bursting = if input.brake {
        (ship.bursting - ctx.dt * BURSTING_RATE).max(-MAX_BURSTING)
    } else if input.burst {
        (ship.bursting + ctx.dt * BURSTING_RATE).min(MAX_BURSTING)
    } else {
        ship.bursting * BURSTING_DECAY
    };
    ship.agent.input = input;

    if let Some(trail) = trail {
        state.trails.append(trail, position);
        state.trails.set_visible(trail, show_trail);
    }
    if let Some(shot) = cannon {
        if let Some(slot) = state.shots.fire(id, shot.faction, &shot.world, shot.mount) {
            state.emit(SimEvent::ShotFired { ship: id, slot });
        }
        state.cue(SoundCue::Laser { ship: id });
    }
    if let Some(launch) = launch {
        fire_missile(state, id, launch);
    }
}

fn fire_missile(state: &mut SimState, id: ShipId, launch: MissileLaunch) {
    let Some(slot) = state
        .missiles
        .launch(launch.target, id, launch.position, launch.rotation, None)
    else {
        tracing::debug!("Missile pool exhausted, launch from ship {} dropped", id);
        return;
    };
    let trail = state.trails.spawn(launch.position, SIDE_MISSILE, MISSILE_COLOR);
    if let Some(missile) = state.missiles.get_mut(slot) {
        missile.trail = trail;
    }
    state.emit(SimEvent::MissileLaunched {
        ship: id,
        target: launch.target,
        slot,
    });
    state.cue(SoundCue::MissileLaunch { ship: id });
}

/// Timer value below which an Immelmann stops pitching and rolls out
#[inline]
fn release_at(duration: f32) -> f32 {
    duration * (1.0 - IMMELMANN_PITCH_PHASE)
}

fn advance_maneuver(ship: &mut Ship, input: &mut ShipInput, duration: f32, dt: f32) {
    match ship.maneuver {
        Maneuver::None => {
            if input.immelmann {
                ship.maneuver = Maneuver::Immelmann;
                ship.maneuver_timer = duration;
            }
        }
        Maneuver::Immelmann => {
            input.dx = 0.0;
            if ship.maneuver_timer >= release_at(duration) {
                input.dy -= IMMELMANN_PITCH;
            } else {
                input.dy = 0.0;
            }
            ship.maneuver_timer -= dt;
            if ship.maneuver_timer <= 0.0 {
                ship.maneuver = Maneuver::None;
            }
        }
    }
}

fn steer(ship: &mut Ship, input: &mut ShipInput, duration: f32, game_speed: f32) {
    // Afterburner widens the turn radius.
    let constrain = (1.1 - ship.bursting * 0.5).min(1.0) * game_speed;
    input.dx *= constrain;
    input.dy *= constrain;

    ship.roll += (input.dx - ship.roll) * ROLL_FOLLOW * game_speed;
    let release = release_at(duration);
    if ship.maneuver == Maneuver::Immelmann && ship.maneuver_timer < release && release > 0.0 {
        ship.roll = (ship.maneuver_timer / release * std::f32::consts::FRAC_PI_2).sin() * IMMELMANN_ROLL;
    }

    let (rx, ry) = steering_rotations(input.dx, input.dy);
    let agent = &mut ship.agent;
    agent.orientation = (agent.orientation * rx * ry).normalize();
    agent.rotation = agent.rotation.slerp(agent.orientation, ROTATION_SMOOTHING);
}

fn throttle(ship: &mut Ship, input: &ShipInput, tunables: &Tunables) {
    ship.speed_ratio = if tunables.max_speed > 0.0 {
        (ship.velocity / tunables.max_speed).min(1.0)
    } else {
        1.0
    };
    if input.burst {
        ship.velocity += tunables.max_accel * (1.0 - ship.speed_ratio) * ACCEL_SCALE;
    } else if input.brake {
        ship.velocity *= BRAKE_DAMPING;
    } else {
        ship.velocity += tunables.max_accel * (CRUISE_RATIO - ship.speed_ratio) * ACCEL_SCALE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::GameDefinition;

    fn create_test_state() -> SimState {
        let mut state = SimState::with_capacity(2, 7);
        state.audio = false;
        state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        state.spawn_ship(Vec3::new(0.0, 0.0, 100.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        state
    }

    fn tick(state: &mut SimState, tunables: &Tunables, dt: f32) {
        let definition = GameDefinition::default();
        let ctx = TickContext::new(tunables, &definition, dt);
        tick_generic(state, 0, &ctx);
    }

    #[test]
    fn test_cruise_accelerates_toward_half_speed() {
        let mut state = create_test_state();
        let tunables = Tunables::default();
        tick(&mut state, &tunables, 16.0);
        let ship = state.ships.get(0).unwrap();
        assert!((ship.velocity - 0.003 * 0.5 * 8.0).abs() < 1e-6);
        assert!(ship.position().z > 0.0 || ship.velocity > 0.0);
    }

    #[test]
    fn test_position_uses_game_speed() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().velocity = 1.0;
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        let mut ctx = TickContext::new(&tunables, &definition, 16.0);
        ctx.game_speed = 0.5;
        tick_generic(&mut state, 0, &ctx);
        let ship = state.ships.get(0).unwrap();
        assert!((ship.position().z - ship.velocity * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_brake_damps_velocity() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.velocity = 1.0;
        ship.agent.input.brake = true;
        tick(&mut state, &Tunables::default(), 16.0);
        let ship = state.ships.get(0).unwrap();
        assert!((ship.velocity - 0.98).abs() < 1e-6);
        assert!(ship.bursting < 0.0);
    }

    #[test]
    fn test_bursting_is_bounded() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.burst = true;
        let tunables = Tunables::default();
        for _ in 0..200 {
            tick(&mut state, &tunables, 100.0);
        }
        assert_eq!(state.ships.get(0).unwrap().bursting, MAX_BURSTING);
    }

    #[test]
    fn test_steering_is_reset_after_tick() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.dx = 0.03;
        tick(&mut state, &Tunables::default(), 16.0);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.agent.input.dx, 0.0);
        assert_eq!(ship.agent.input.dy, 0.0);
        assert_ne!(ship.agent.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_rotation_trails_orientation() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.dx = 0.04;
        tick(&mut state, &Tunables::default(), 16.0);
        let ship = state.ships.get(0).unwrap();
        let full = ship.agent.orientation.angle_between(Quat::IDENTITY);
        let rendered = ship.agent.rotation.angle_between(Quat::IDENTITY);
        assert!(rendered < full);
        assert!(rendered > 0.0);
    }

    #[test]
    fn test_cannons_alternate() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.shooting = true;
        let tunables = Tunables::default();
        tick(&mut state, &tunables, 16.0);
        tick(&mut state, &tunables, 16.0);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.stats.shots_fired, 2);
        assert_eq!(ship.cannon_index, 0);
        assert_eq!(state.shots.active_count(), 2);
        let left = state.shots.position(0);
        let right = state.shots.position(1);
        assert!(left.x < 0.0 && right.x > 0.0);
    }

    #[test]
    fn test_no_shot_without_cadence_or_time() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.shooting = true;
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        let mut ctx = TickContext::new(&tunables, &definition, 16.0);
        ctx.can_shoot = false;
        tick_generic(&mut state, 0, &ctx);
        let ctx = TickContext::new(&tunables, &definition, 0.0);
        tick_generic(&mut state, 0, &ctx);
        assert_eq!(state.shots.active_count(), 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_missile_needs_lock() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.best_prey = Some(1);
        ship.best_prey_time = 100.0;
        ship.agent.input.launch_missile = true;
        tick(&mut state, &Tunables::default(), 16.0);
        assert_eq!(state.missiles.valid_count(), 0);
        assert_eq!(state.ships.get(0).unwrap().available_missiles, 8);
    }

    #[test]
    fn test_missile_launch_after_lock() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.best_prey = Some(1);
        ship.best_prey_time = 2500.0;
        ship.agent.input.launch_missile = true;
        let tunables = Tunables::default();
        tick(&mut state, &tunables, 16.0);
        assert_eq!(state.missiles.valid_count(), 1);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.available_missiles, 7);
        assert_eq!(ship.stats.missiles_fired, 1);
        assert_eq!(ship.missile_cooldown, tunables.missile_cooldown_time);
        let missile = state.missiles.get(0).unwrap();
        assert_eq!(missile.target, Some(1));
        assert_eq!(missile.fired_by, Some(0));
        assert!(missile.trail.is_some());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::MissileLaunched { ship: 0, target: 1, .. })));

        // cooling down
        tick(&mut state, &tunables, 16.0);
        assert_eq!(state.missiles.valid_count(), 1);
    }

    #[test]
    fn test_empty_rack_still_cools_down() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.available_missiles = 0;
        ship.best_prey = Some(1);
        ship.best_prey_time = 2500.0;
        ship.agent.input.launch_missile = true;
        let tunables = Tunables::default();
        tick(&mut state, &tunables, 16.0);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(state.missiles.valid_count(), 0);
        assert_eq!(ship.stats.missiles_fired, 0);
        assert_eq!(ship.missile_cooldown, tunables.missile_cooldown_time);
    }

    #[test]
    fn test_immelmann_pitches_then_releases() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.input.immelmann = true;
        let tunables = Tunables::default();
        tick(&mut state, &tunables, 100.0);
        let ship = state.ships.get_mut(0).unwrap();
        assert_eq!(ship.maneuver, Maneuver::Immelmann);
        assert_eq!(ship.maneuver_timer, 1000.0);
        ship.agent.input.immelmann = false;

        tick(&mut state, &tunables, 100.0);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.maneuver_timer, 900.0);
        assert_ne!(ship.agent.orientation, Quat::IDENTITY);

        for _ in 0..9 {
            tick(&mut state, &tunables, 100.0);
        }
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.maneuver, Maneuver::None);
    }

    #[test]
    fn test_trail_follows_only_in_realtime() {
        let mut state = create_test_state();
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        let mut ctx = TickContext::new(&tunables, &definition, 16.0);
        ctx.target_speed = 0.0;
        let trail = state.ships.get(0).unwrap().trail.unwrap();
        state.trails.set_visible(trail, false);
        tick_generic(&mut state, 0, &ctx);
        assert!(!state.trails.get(trail).unwrap().visible);
        tick(&mut state, &tunables, 16.0);
        assert!(state.trails.get(trail).unwrap().visible);
    }
}
