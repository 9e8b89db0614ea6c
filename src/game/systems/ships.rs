//! Ship update loop

use crate::game::constants::pacing::FROZEN_SPEED;
use crate::game::state::SimState;
use crate::game::systems::{ai, collision, flight, targeting, TickContext};

/// Update every ship in slot order.
///
/// Per ship: pilot, flight model, shot and missile hits, human target
/// acquisition, asteroids, end of life. Nothing moves while the game is
/// frozen.
pub fn update(state: &mut SimState, ctx: &TickContext) {
    if ctx.game_speed <= FROZEN_SPEED {
        return;
    }
    state.time += ctx.dt;

    for id in 0..state.ships.capacity() {
        let Some(ship) = state.ships.get_mut(id) else {
            continue;
        };
        if !ship.active {
            continue;
        }
        let mut crashed = false;
        if ship.is_valid() {
            ship.stats.time_of_battle += ctx.dt;
            let is_human = ship.is_human;
            if is_human {
                ai::pilot_human(state, id, ctx);
            } else {
                ai::think(state, id, ctx);
            }
            flight::tick_generic(state, id, ctx);
            collision::resolve_shots(state, id, ctx);
            collision::resolve_missiles(state, id, ctx);
            if is_human {
                targeting::acquire_for_human(state, id, ctx);
                if let Some(ship) = state.ships.get_mut(id) {
                    ship.thruster_volume = (ship.bursting / 2.0).max(0.0);
                }
            }
            if state.ships.is_valid(id) {
                crashed = collision::resolve_asteroids(state, id);
            }
        }
        collision::end_of_life(state, id, crashed);
    }
}

/// Let every chase camera catch up with its ship.
pub fn update_cameras(state: &mut SimState, ctx: &TickContext) {
    for (id, camera) in state.cameras.iter_mut().enumerate() {
        let Some(camera) = camera else {
            continue;
        };
        if let Some(ship) = state.ships.get(id).filter(|s| s.is_valid()) {
            camera.update(ship, ctx.game_speed);
        }
    }
}
