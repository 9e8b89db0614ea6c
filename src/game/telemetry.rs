//! HUD telemetry of human ships

use glam::Vec3;
use serde::Serialize;

use crate::game::ship::{Faction, ShipId, ShipPool};
use crate::game::state::SimState;
use crate::game::tunables::Tunables;

/// What the cockpit display of one human ship shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShipTelemetry {
    pub life: f32,
    pub speed_ratio: f32,
    /// Remaining missile cooldown (ms)
    pub missile_cooldown: f32,
    pub best_target: Option<ShipId>,
    /// 0 when the target was just acquired, 1 once a missile can lock
    pub lock_progress: f32,
    pub bursting: f32,
    /// A missile launch would fire right now
    pub missile_ready: bool,
    /// Valid enemies projected inside the chase camera view
    pub enemies_on_screen: u32,
}

impl ShipTelemetry {
    /// Telemetry of `id`, `None` for an unknown slot.
    pub fn from_ship(state: &SimState, id: ShipId, tunables: &Tunables) -> Option<Self> {
        let ship = state.ships.get(id)?;
        let lock_progress = if ship.best_prey.is_some() {
            lock_ratio(ship.best_prey_time, tunables.time_to_lock_missile)
        } else {
            0.0
        };
        let missile_ready = ship.best_prey.is_some()
            && ship.missile_cooldown <= 0.0
            && ship.available_missiles > 0
            && lock_progress >= 1.0;

        Some(Self {
            life: ship.life,
            speed_ratio: ship.speed_ratio,
            missile_cooldown: ship.missile_cooldown,
            best_target: ship.best_prey,
            lock_progress,
            bursting: ship.bursting,
            missile_ready,
            enemies_on_screen: enemies_on_screen(state, id),
        })
    }
}

fn lock_ratio(held: f32, time_to_lock: f32) -> f32 {
    if time_to_lock <= 0.0 {
        return 1.0;
    }
    (held / time_to_lock).clamp(0.0, 1.0)
}

fn enemies_on_screen(state: &SimState, id: ShipId) -> u32 {
    let camera = state.cameras.get(id).and_then(Option::as_ref);
    let (Some(camera), Some(ship)) = (camera, state.ships.get(id)) else {
        return 0;
    };
    count_enemies(&state.ships, id, ship.faction, |p| camera.is_on_screen(p))
}

fn count_enemies(
    ships: &ShipPool,
    id: ShipId,
    faction: Faction,
    mut visible: impl FnMut(Vec3) -> bool,
) -> u32 {
    ships
        .iter()
        .enumerate()
        .filter(|(other, s)| *other != id && s.is_valid() && s.faction != faction)
        .filter(|(_, s)| visible(s.position()))
        .count() as u32
}
