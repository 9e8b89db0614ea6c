//! Prey selection
//!
//! A ship picks the enemy most aligned with its nose, ignoring anything
//! outside its perception cone. AI ships also respect the targeting cap:
//! a prey already chased by `ai_max_targets` other AI ships is skipped.

use crate::game::ship::ShipId;
use crate::game::state::SimState;
use crate::game::systems::TickContext;
use crate::game::tunables::Tunables;

/// Room for one more AI pursuer of `target`, not counting `hunter`.
#[inline]
pub fn has_room(state: &SimState, target: ShipId, hunter: ShipId, tunables: &Tunables) -> bool {
    state.ships.ai_targeting(target, hunter) < tunables.ai_max_targets as usize
}

/// Best prey for ship `id`.
///
/// Also refreshes the ship's `dot_to_enemy` and `dot_to_ally`, the best
/// alignment with any enemy and any ally seen this frame. Human ships only
/// consider ships inside their chase camera frame.
pub fn find_best_prey(state: &mut SimState, id: ShipId, tunables: &Tunables) -> Option<ShipId> {
    let ship = state.ships.get(id)?;
    let camera = state.cameras.get(id).and_then(Option::as_ref);
    let cone = tunables.ai_perception_cone;
    let mut best = None;
    let mut best_dot = cone;
    let mut dot_to_enemy = cone;
    let mut dot_to_ally = cone;

    for (other_id, other) in state.ships.iter().enumerate() {
        if other_id == id || !other.is_valid() {
            continue;
        }
        if let Some(camera) = camera {
            if !camera.is_on_screen(other.position()) {
                continue;
            }
        }
        let dot = ship.agent.dot_to(other.position());
        if other.faction != ship.faction {
            if dot > dot_to_enemy {
                dot_to_enemy = dot;
            }
            if dot > best_dot && (ship.is_human || has_room(state, other_id, id, tunables)) {
                best = Some(other_id);
                best_dot = dot;
            }
        } else if dot > dot_to_ally {
            dot_to_ally = dot;
        }
    }

    if let Some(ship) = state.ships.get_mut(id) {
        ship.dot_to_enemy = dot_to_enemy;
        ship.dot_to_ally = dot_to_ally;
    }
    best
}

/// Keep `prey` as the ship's target, accumulating hold time while it does
/// not change.
pub fn hold_prey(state: &mut SimState, id: ShipId, prey: Option<ShipId>, dt: f32) {
    let Some(ship) = state.ships.get_mut(id) else {
        return;
    };
    if prey == ship.best_prey {
        ship.best_prey_time += dt;
    } else {
        ship.best_prey = prey;
        ship.best_prey_time = 0.0;
    }
}

/// Missile lock for human pilots: search only while the launcher is ready.
pub fn acquire_for_human(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let ready = state
        .ships
        .get(id)
        .map_or(false, |ship| ship.missile_cooldown <= 0.0);
    if ready {
        let prey = find_best_prey(state, id, ctx.tunables);
        hold_prey(state, id, prey, ctx.dt);
    } else if let Some(ship) = state.ships.get_mut(id) {
        ship.best_prey = None;
        ship.best_prey_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::GameDefinition;
    use crate::game::ship::Faction;
    use glam::{Quat, Vec3};

    /// One hunter at the origin looking down +Z at enemies lined up ahead.
    fn create_test_state(enemies: usize) -> SimState {
        let mut state = SimState::with_capacity(8, 3);
        state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        for i in 0..enemies {
            let position = Vec3::new(i as f32 * 10.0, 0.0, 200.0);
            state.spawn_ship(position, Quat::IDENTITY, Faction::Raider, false, 10.0);
        }
        state
    }

    #[test]
    fn test_prefers_aligned_enemy() {
        let mut state = create_test_state(2);
        let prey = find_best_prey(&mut state, 0, &Tunables::default());
        assert_eq!(prey, Some(1));
        let ship = state.ships.get(0).unwrap();
        assert!((ship.dot_to_enemy - 1.0).abs() < 1e-6);
        assert_eq!(ship.dot_to_ally, -0.5);
    }

    #[test]
    fn test_ignores_enemy_behind_cone() {
        let mut state = SimState::with_capacity(2, 3);
        state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        state.spawn_ship(Vec3::new(0.0, 0.0, -200.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        assert_eq!(find_best_prey(&mut state, 0, &Tunables::default()), None);
    }

    #[test]
    fn test_ignores_dead_ships() {
        let mut state = create_test_state(1);
        state.ships.get_mut(1).unwrap().life = 0.0;
        assert_eq!(find_best_prey(&mut state, 0, &Tunables::default()), None);
    }

    #[test]
    fn test_ally_alignment_tracked() {
        let mut state = create_test_state(0);
        state.spawn_ship(Vec3::new(0.0, 0.0, 50.0), Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        assert_eq!(find_best_prey(&mut state, 0, &Tunables::default()), None);
        assert!((state.ships.get(0).unwrap().dot_to_ally - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_targeting_cap() {
        let mut state = create_test_state(1);
        // four more allied AI ships already chasing the enemy
        for i in 0..4 {
            let id = state
                .spawn_ship(Vec3::new(0.0, i as f32, -10.0), Quat::IDENTITY, Faction::Valkyrie, false, 10.0)
                .unwrap();
            state.ships.get_mut(id).unwrap().best_prey = Some(1);
        }
        let tunables = Tunables::default();
        assert_eq!(find_best_prey(&mut state, 0, &tunables), None);

        state.ships.get_mut(5).unwrap().best_prey = None;
        assert_eq!(find_best_prey(&mut state, 0, &tunables), Some(1));
    }

    #[test]
    fn test_capped_enemy_falls_back_to_next_aligned() {
        let mut state = create_test_state(1);
        state.spawn_ship(Vec3::new(100.0, 0.0, 200.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        for i in 0..4 {
            let id = state
                .spawn_ship(Vec3::new(0.0, i as f32, -10.0), Quat::IDENTITY, Faction::Valkyrie, false, 10.0)
                .unwrap();
            state.ships.get_mut(id).unwrap().best_prey = Some(1);
        }
        assert_eq!(find_best_prey(&mut state, 0, &Tunables::default()), Some(2));
        // alignment still reflects the capped enemy dead ahead
        assert!((state.ships.get(0).unwrap().dot_to_enemy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cap_does_not_apply_to_humans() {
        let mut state = create_test_state(1);
        state.ships.get_mut(0).unwrap().is_human = true;
        for i in 0..4 {
            let id = state
                .spawn_ship(Vec3::new(0.0, i as f32, -10.0), Quat::IDENTITY, Faction::Valkyrie, false, 10.0)
                .unwrap();
            state.ships.get_mut(id).unwrap().best_prey = Some(1);
        }
        assert_eq!(find_best_prey(&mut state, 0, &Tunables::default()), Some(1));
    }

    #[test]
    fn test_hold_prey_accumulates() {
        let mut state = create_test_state(1);
        hold_prey(&mut state, 0, Some(1), 16.0);
        hold_prey(&mut state, 0, Some(1), 16.0);
        assert_eq!(state.ships.get(0).unwrap().best_prey_time, 16.0);
        hold_prey(&mut state, 0, None, 16.0);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.best_prey, None);
        assert_eq!(ship.best_prey_time, 0.0);
    }

    #[test]
    fn test_human_acquisition_waits_for_cooldown() {
        let mut state = create_test_state(1);
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        let ctx = TickContext::new(&tunables, &definition, 16.0);
        let ship = state.ships.get_mut(0).unwrap();
        ship.is_human = true;
        ship.missile_cooldown = 500.0;
        ship.best_prey = Some(1);
        acquire_for_human(&mut state, 0, &ctx);
        assert_eq!(state.ships.get(0).unwrap().best_prey, None);

        state.ships.get_mut(0).unwrap().missile_cooldown = 0.0;
        acquire_for_human(&mut state, 0, &ctx);
        acquire_for_human(&mut state, 0, &ctx);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.best_prey, Some(1));
        assert_eq!(ship.best_prey_time, 16.0);
    }
}
