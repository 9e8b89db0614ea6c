//! Shot and missile updates

use glam::Vec3;

use crate::game::constants::collision::{MISSILE_ASTEROID_RADIUS, SHOT_ASTEROID_RADIUS};
use crate::game::constants::pacing::MIN_ACTIVE_DT;
use crate::game::constants::weapons::{MISSILE_MAX_TURN, MISSILE_SPEED, MISSILE_TURN_RAMP};
use crate::game::events::{SimEvent, SoundCue};
use crate::game::state::SimState;
use crate::game::systems::TickContext;
use crate::util::math::steering_rotations;

/// Move every shot and flag the instance buffer as dirty.
pub fn update_shots(state: &mut SimState, ctx: &TickContext) {
    state.shots.tick(ctx.dt, &state.field, SHOT_ASTEROID_RADIUS);
    state.emit(SimEvent::ShotBufferUpdated);
}

/// Steer every flying missile toward its target.
///
/// A missile whose target is gone, that hit an asteroid or ran out of fuel
/// detonates where it is.
pub fn update_missiles(state: &mut SimState, ctx: &TickContext) {
    let dt = ctx.dt;
    for slot in 0..state.missiles.as_slice().len() {
        let Some(missile) = state.missiles.get(slot) else {
            continue;
        };
        if !missile.is_valid() {
            continue;
        }
        let aim = missile
            .target
            .and_then(|t| state.ships.get(t))
            .filter(|ship| ship.is_valid())
            .map(|ship| ship.position());

        let Some(missile) = state.missiles.get_mut(slot) else {
            continue;
        };
        missile.agent.refresh_basis();
        let forward = missile.agent.forward;
        let mut keep = aim.is_some();
        if state.field.collide(missile.position(), MISSILE_ASTEROID_RADIUS) {
            missile.expire();
            keep = false;
        }

        if let (true, Some(aim)) = (keep, aim) {
            let turn = (missile.time / MISSILE_TURN_RAMP).min(MISSILE_MAX_TURN);
            missile.agent.go_toward(aim, turn);
            let (rx, ry) = steering_rotations(missile.agent.input.dx, missile.agent.input.dy);
            keep = missile.set_time(missile.time + dt);
            if keep {
                let agent = &mut missile.agent;
                agent.orientation = (agent.orientation * rx * ry).normalize();
                agent.rotation = agent.orientation;
                agent.position += forward * MISSILE_SPEED * dt;
                if dt > MIN_ACTIVE_DT {
                    if let Some(trail) = missile.trail {
                        state.trails.append(trail, missile.agent.position);
                    }
                }
            }
        }

        if !keep {
            let (position, rotation) = (missile.position(), missile.agent.rotation);
            missile.expire();
            if let Some(trail) = missile.trail.take() {
                state.trails.release(trail);
            }
            state.explosions.spawn(position, rotation);
            state.emit(SimEvent::MissileDetonated { slot, position });
            state.cue(SoundCue::Explosion { position });
        }
    }
}
