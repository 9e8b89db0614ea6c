//! Pilots: the AI state machine and the human input guard

use glam::Vec3;

use crate::game::constants::ai::{
    AVOID_TURN_RATIO, BRAKE_ALIGNMENT, BURST_ALIGNMENT, WANDER_FREQUENCY,
};
use crate::game::constants::collision::AVOID_PROBE_RADIUS;
use crate::game::ship::{AiState, ShipId};
use crate::game::state::SimState;
use crate::game::systems::targeting::{find_best_prey, hold_prey};
use crate::game::systems::TickContext;

/// Pick the AI state of ship `id` for this frame.
///
/// Priority: asteroid avoidance, return to the arena, evasion after a hit,
/// chase, wander.
pub fn select_state(state: &mut SimState, id: ShipId, ctx: &TickContext) -> AiState {
    let Some(ship) = state.ships.get(id) else {
        return AiState::Wander;
    };
    let position = ship.position();

    if let Some(avoid_to) = state.field.should_avoid(position, AVOID_PROBE_RADIUS) {
        if let Some(ship) = state.ships.get_mut(id) {
            ship.avoid_to = avoid_to;
        }
        return AiState::Avoid;
    }
    if position.length() > ctx.definition.enemy_boundary_radius {
        return AiState::Return;
    }
    if ship.evade_timer > 0.0 {
        if let Some(ship) = state.ships.get_mut(id) {
            ship.evade_timer -= ctx.dt;
        }
        return AiState::Evade;
    }

    let prey = find_best_prey(state, id, ctx.tunables);
    hold_prey(state, id, prey, ctx.dt);
    if prey.is_some() {
        AiState::Chase
    } else {
        AiState::Wander
    }
}

/// Run the AI pilot of ship `id`: choose a state, then write its steering
/// and buttons into the ship input.
pub fn think(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let ai_state = select_state(state, id, ctx);
    let tunables = ctx.tunables;
    let time = state.time;

    // What the chased ship looks like this frame
    let prey = match ai_state {
        AiState::Chase => state
            .ships
            .get(id)
            .and_then(|s| s.best_prey)
            .and_then(|prey| state.ships.get(prey))
            .map(|enemy| (enemy.position(), enemy.agent.rotation * Vec3::Z, enemy.velocity)),
        _ => None,
    };
    let jitter = (
        (2.0 * state.random() - 1.0) * tunables.ai_input_randomness,
        (2.0 * state.random() - 1.0) * tunables.ai_input_randomness,
    );

    let Some(ship) = state.ships.get_mut(id) else {
        return;
    };
    ship.ai_state = ai_state;
    ship.agent.input.clear_actions();

    match ai_state {
        AiState::Avoid => {
            let target = ship.avoid_to;
            ship.agent.go_toward(target, AVOID_TURN_RATIO);
        }
        AiState::Return => {
            ship.agent.go_toward(Vec3::ZERO, AVOID_TURN_RATIO);
        }
        AiState::Evade => {
            ship.agent.input.burst = true;
            let target = ship.evade_to;
            ship.agent.go_toward(target, tunables.ai_turn_rate);
        }
        AiState::Chase => {
            if let Some((enemy_position, enemy_forward, enemy_velocity)) = prey {
                let forward = enemy_forward.normalize_or_zero();
                let goto = enemy_position + forward * tunables.ai_follow_distance;
                ship.agent.go_toward(goto, tunables.ai_turn_rate);

                let fire_at = enemy_position + forward * tunables.ai_prediction_range * enemy_velocity;
                let fire_dot = ship.agent.dot_to(fire_at);
                let distance = ship.position().distance(enemy_position);
                let input = &mut ship.agent.input;
                if (distance < tunables.ai_break_distance || ship.dot_to_enemy < BRAKE_ALIGNMENT)
                    && ship.velocity > tunables.ai_minimum_speed
                {
                    input.brake = true;
                }
                if distance > tunables.ai_burst_distance
                    && ship.dot_to_enemy > BURST_ALIGNMENT
                    && ship.velocity < tunables.ai_maximum_speed
                {
                    input.burst = true;
                }
                if fire_dot > tunables.ai_fire_precision
                    && ship.dot_to_ally < tunables.ai_friendly_fire_precision
                    && distance < tunables.ai_fire_range
                {
                    input.shooting = true;
                }
            }
        }
        AiState::Wander => {
            ship.agent.input.dx = (time * WANDER_FREQUENCY).cos() * tunables.ai_turn_rate;
            ship.agent.input.dy = (time * WANDER_FREQUENCY).sin() * tunables.ai_turn_rate;
        }
    }

    ship.agent.input.dx += jitter.0;
    ship.agent.input.dy += jitter.1;
}

/// Guard a human ship: clamp its steering to the player turn rate and keep
/// it inside the playable sphere.
pub fn pilot_human(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let Some(ship) = state.ships.get_mut(id) else {
        return;
    };
    ship.agent.input.constrain(ctx.tunables.player_turn_rate);
    ship.agent.position = ship
        .agent
        .position
        .clamp_length_max(ctx.definition.human_boundary_radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::GameDefinition;
    use crate::game::ship::Faction;
    use crate::game::tunables::Tunables;
    use crate::game::world::{Asteroid, AsteroidField, SubSphere};
    use glam::Quat;

    fn create_test_state() -> SimState {
        let mut state = SimState::with_capacity(4, 11);
        state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        state
    }

    fn run(state: &mut SimState, tunables: &Tunables) {
        let definition = GameDefinition::default();
        let ctx = TickContext::new(tunables, &definition, 16.0);
        think(state, 0, &ctx);
    }

    #[test]
    fn test_wander_without_enemies() {
        let mut state = create_test_state();
        let tunables = Tunables::default();
        run(&mut state, &tunables);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Wander);
        // time 0: full yaw, no pitch
        assert!((ship.agent.input.dx - tunables.ai_turn_rate).abs() < 1e-6);
        assert!(ship.agent.input.dy.abs() < 1e-6);
    }

    #[test]
    fn test_chase_visible_enemy() {
        let mut state = create_test_state();
        state.spawn_ship(Vec3::new(0.0, 0.0, 100.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        let tunables = Tunables::default();
        run(&mut state, &tunables);
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Chase);
        assert_eq!(ship.best_prey, Some(1));
        // straight ahead and within range
        assert!(ship.agent.input.shooting);
    }

    #[test]
    fn test_chase_holds_fire_near_ally() {
        let mut state = create_test_state();
        state.spawn_ship(Vec3::new(0.0, 0.0, 100.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        state.spawn_ship(Vec3::new(0.0, 0.0, 50.0), Quat::IDENTITY, Faction::Valkyrie, false, 10.0);
        run(&mut state, &Tunables::default());
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Chase);
        assert!(!ship.agent.input.shooting);
    }

    #[test]
    fn test_chase_bursts_toward_distant_enemy() {
        let mut state = create_test_state();
        state.spawn_ship(Vec3::new(0.0, 0.0, 390.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        let tunables = Tunables {
            ai_burst_distance: 300.0,
            ..Default::default()
        };
        run(&mut state, &tunables);
        assert!(state.ships.get(0).unwrap().agent.input.burst);
    }

    #[test]
    fn test_return_outside_boundary() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.position = Vec3::new(0.0, 0.0, 500.0);
        run(&mut state, &Tunables::default());
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Return);
        // home is straight behind: no lateral steering
        assert!(ship.agent.input.dx.abs() < 1e-6);
    }

    #[test]
    fn test_evade_after_hit() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.evade_timer = 100.0;
        ship.evade_to = Vec3::new(1000.0, 0.0, 0.0);
        run(&mut state, &Tunables::default());
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Evade);
        assert_eq!(ship.evade_timer, 84.0);
        assert!(ship.agent.input.burst);
        assert!(ship.agent.input.dx > 0.0);
    }

    #[test]
    fn test_avoid_has_priority() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().evade_timer = 100.0;
        state.field = AsteroidField::new(vec![Asteroid::from_parts(vec![
            SubSphere { center: Vec3::new(-10.0, 0.0, 30.0), radius: 4.0 },
            SubSphere { center: Vec3::new(10.0, 0.0, 30.0), radius: 4.0 },
        ])]);
        run(&mut state, &Tunables::default());
        let ship = state.ships.get(0).unwrap();
        assert_eq!(ship.ai_state, AiState::Avoid);
        assert_eq!(ship.evade_timer, 100.0);
    }

    #[test]
    fn test_actions_cleared_each_frame() {
        let mut state = create_test_state();
        let input = &mut state.ships.get_mut(0).unwrap().agent.input;
        input.shooting = true;
        input.brake = true;
        run(&mut state, &Tunables::default());
        let input = state.ships.get(0).unwrap().agent.input;
        assert!(!input.shooting);
        assert!(!input.brake);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let mut state = create_test_state();
        let tunables = Tunables {
            ai_input_randomness: 0.01,
            ..Default::default()
        };
        for _ in 0..50 {
            run(&mut state, &tunables);
            let input = state.ships.get(0).unwrap().agent.input;
            assert!((input.dx - tunables.ai_turn_rate).abs() <= 0.01);
            assert!(input.dy.abs() <= 0.01);
        }
    }

    #[test]
    fn test_human_steering_clamp() {
        let mut state = create_test_state();
        let ship = state.ships.get_mut(0).unwrap();
        ship.is_human = true;
        ship.agent.input.dx = 5.0;
        ship.agent.input.dy = -5.0;
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        pilot_human(&mut state, 0, &TickContext::new(&tunables, &definition, 16.0));
        let input = state.ships.get(0).unwrap().agent.input;
        assert_eq!(input.dx, tunables.player_turn_rate);
        assert_eq!(input.dy, -tunables.player_turn_rate);
    }

    #[test]
    fn test_human_boundary() {
        let mut state = create_test_state();
        state.ships.get_mut(0).unwrap().agent.position = Vec3::new(0.0, 900.0, 0.0);
        let tunables = Tunables::default();
        let definition = GameDefinition::default();
        pilot_human(&mut state, 0, &TickContext::new(&tunables, &definition, 16.0));
        let position = state.ships.get(0).unwrap().position();
        assert!((position.y - definition.human_boundary_radius).abs() < 1e-3);
    }
}
