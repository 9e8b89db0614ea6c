//! Collision and damage
//!
//! Everything that can hurt a ship is resolved from the ship's own update,
//! in a fixed order: cannon shots, the missile chasing it, asteroids. Once
//! life drops to zero the end-of-life sweep credits the kill and clears
//! every handle other entities hold on the ship.

use glam::Vec3;
use tracing::info;

use crate::game::constants::ai::EVADE_DISTANCE;
use crate::game::constants::collision::{
    CRASH_LIFE, MISSILE_HIT_DIST_SQ, SHIP_ASTEROID_RADIUS, SHOT_HIT_DIST_SQ,
};
use crate::game::events::{SimEvent, SoundCue};
use crate::game::ship::{Maneuver, ShipId};
use crate::game::state::SimState;
use crate::game::systems::targeting::has_room;
use crate::game::systems::TickContext;

/// Apply every enemy shot within reach of ship `id`.
///
/// Stops at the hit that destroys the ship, the remaining shots fly on.
pub fn resolve_shots(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let damage = ctx.definition.shot_damage;
    for slot in 0..state.shots.records().len() {
        let record = state.shots.records()[slot];
        if !record.is_active() || record.fired_by == Some(id) {
            continue;
        }
        let Some(ship) = state.ships.get(id) else {
            return;
        };
        let (position, rotation, is_human) = (ship.position(), ship.agent.rotation, ship.is_human);
        let impact = state.shots.position(slot);
        if position.distance_squared(impact) > SHOT_HIT_DIST_SQ {
            continue;
        }

        state.sparks.spawn(position, rotation);
        state.shots.kill(slot);
        let shooter = record.fired_by;
        if let Some(attacker) = shooter.and_then(|s| state.ships.get_mut(s)) {
            attacker.stats.damage_dealt += damage;
            attacker.stats.shots_hitting += 1;
        }

        let shooter_faction = shooter.and_then(|s| state.ships.get(s)).map(|s| s.faction);
        let may_retarget = shooter.map_or(false, |s| has_room(state, s, id, ctx.tunables));
        let roll = if is_human { 1.0 } else { state.random() };
        let Some(ship) = state.ships.get_mut(id) else {
            return;
        };
        ship.stats.damage_taken += damage;
        ship.life -= damage;
        if shooter.is_some() {
            ship.last_attacker = shooter;
        }

        if !ship.is_human {
            ship.evade_timer = ctx.tunables.ai_evade_time;
            ship.evade_to = evade_point(position, impact, ship.agent.forward);
            if let (Some(attacker), Some(faction)) = (shooter, shooter_faction) {
                if faction != ship.faction && may_retarget && ship.best_prey != Some(attacker) {
                    ship.best_prey = Some(attacker);
                    ship.best_prey_time = 0.0;
                }
            }
            if roll < ctx.tunables.ai_immelmann_probability && ship.maneuver == Maneuver::None {
                ship.maneuver = Maneuver::Immelmann;
                ship.maneuver_timer = ctx.tunables.immelmann_duration;
            }
        }

        let destroyed = !ship.is_valid();
        state.emit(SimEvent::ShipHit {
            ship: id,
            attacker: shooter,
            damage,
        });
        if destroyed {
            break;
        }
        state.cue(SoundCue::Impact { ship: id });
    }
}

/// Detonate missiles that reached ship `id`. Only missiles chasing this
/// ship can hit it.
pub fn resolve_missiles(state: &mut SimState, id: ShipId, ctx: &TickContext) {
    let damage = ctx.definition.missile_damage;
    for slot in 0..state.missiles.as_slice().len() {
        let Some(position) = state.ships.get(id).map(|s| s.position()) else {
            return;
        };
        let Some(missile) = state.missiles.get_mut(slot) else {
            continue;
        };
        if !missile.is_valid() || missile.target != Some(id) {
            continue;
        }
        let missile_position = missile.position();
        if missile_position.distance_squared(position) >= MISSILE_HIT_DIST_SQ {
            continue;
        }
        let shooter = missile.fired_by;
        missile.expire();
        if let Some(trail) = missile.trail.take() {
            state.trails.release(trail);
        }

        if let Some(attacker) = shooter.and_then(|s| state.ships.get_mut(s)) {
            attacker.stats.damage_dealt += damage;
        }
        if let Some(ship) = state.ships.get_mut(id) {
            ship.life -= damage;
            ship.stats.damage_taken += damage;
            if shooter.is_some() {
                ship.last_attacker = shooter;
            }
        }
        state.emit(SimEvent::MissileDetonated {
            slot,
            position: missile_position,
        });
        state.emit(SimEvent::ShipHit {
            ship: id,
            attacker: shooter,
            damage,
        });
    }
}

/// Asteroids are lethal. Returns `true` when ship `id` crashed.
pub fn resolve_asteroids(state: &mut SimState, id: ShipId) -> bool {
    let Some(ship) = state.ships.get(id) else {
        return false;
    };
    if !state.field.collide(ship.position(), SHIP_ASTEROID_RADIUS) {
        return false;
    }
    let faction = ship.faction.index();
    if let Some(ship) = state.ships.get_mut(id) {
        ship.life = CRASH_LIFE;
    }
    state.crashes[faction] += 1;
    true
}

/// Process the destruction of ship `id` once its life is gone.
///
/// Runs at most once per destruction: the sweep clears `active`, so calling
/// it again is a no-op. Returns `true` when the ship was destroyed now.
pub fn end_of_life(state: &mut SimState, id: ShipId, crashed: bool) -> bool {
    let Some(ship) = state.ships.get(id) else {
        return false;
    };
    if !ship.active || ship.is_valid() {
        return false;
    }
    let (position, rotation) = (ship.position(), ship.agent.rotation);
    let killer = if crashed { None } else { ship.last_attacker };

    for trail in state.missiles.invalidate_chasing(id) {
        state.trails.release(trail);
    }
    if let Some(killer) = killer.and_then(|k| state.ships.get_mut(k)) {
        killer.stats.kills += 1;
    }
    state.explosions.spawn(position, rotation);
    state.cue(SoundCue::Explosion { position });
    state.emit(SimEvent::ShipDestroyed {
        ship: id,
        killer,
        crashed,
    });
    info!(
        "Ship {} destroyed ({})",
        id,
        match (crashed, killer) {
            (true, _) => "asteroid".to_string(),
            (false, Some(k)) => format!("by ship {}", k),
            (false, None) => "unattributed".to_string(),
        }
    );
    destroy_ship(state, id);
    true
}

/// Free the slot of ship `id` and drop every handle pointing at it.
pub fn destroy_ship(state: &mut SimState, id: ShipId) {
    state.shots.clear_owner(id);
    state.missiles.clear_shooter(id);

    if let Some(ship) = state.ships.get_mut(id) {
        if let Some(trail) = ship.trail.take() {
            state.trails.release(trail);
        }
        ship.active = false;
        ship.visible = false;
        ship.bursting = 0.0;
        ship.best_prey = None;
        ship.best_prey_time = 0.0;
    }
    if let Some(camera) = state.cameras.get_mut(id) {
        *camera = None;
    }

    for other in state.ships.iter_mut() {
        if other.best_prey == Some(id) {
            other.best_prey = None;
            other.best_prey_time = 0.0;
        }
        if other.last_attacker == Some(id) {
            other.last_attacker = None;
        }
    }
}

/// Point an AI ship flees toward after a hit from `impact`: sideways
/// relative to both the hit direction and its heading.
#[inline]
pub fn evade_point(position: Vec3, impact: Vec3, forward: Vec3) -> Vec3 {
    position + (impact - position).normalize_or_zero().cross(forward) * EVADE_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::GameDefinition;
    use crate::game::ship::Faction;
    use crate::game::tunables::Tunables;
    use crate::game::world::{Asteroid, AsteroidField, SubSphere};
    use crate::util::math::world_matrix;
    use glam::Quat;

    /// A target at the origin and a shooter 100 units away.
    fn create_test_state(target_life: f32, human: bool) -> SimState {
        let mut state = SimState::with_capacity(3, 5);
        state.audio = false;
        state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, Faction::Valkyrie, human, target_life);
        state.spawn_ship(Vec3::new(0.0, 0.0, 100.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        state
    }

    /// Drop a shot fired by `owner` right on top of `at`.
    fn place_shot(state: &mut SimState, owner: ShipId, at: Vec3) {
        let faction = state.ships.get(owner).unwrap().faction;
        let mount = Vec3::new(0.0, 0.0, -0.2);
        state
            .shots
            .fire(owner, faction, &world_matrix(at, Quat::IDENTITY), mount)
            .unwrap();
    }

    fn ctx<'a>(tunables: &'a Tunables, definition: &'a GameDefinition) -> TickContext<'a> {
        TickContext::new(tunables, definition, 16.0)
    }

    #[test]
    fn test_shot_hit_bookkeeping() {
        let mut state = create_test_state(100.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        place_shot(&mut state, 1, Vec3::new(0.0, 5.0, 0.0));
        resolve_shots(&mut state, 0, &ctx(&tunables, &definition));

        let target = state.ships.get(0).unwrap();
        assert_eq!(target.life, 99.0);
        assert_eq!(target.stats.damage_taken, 1.0);
        assert_eq!(target.last_attacker, Some(1));
        assert_eq!(target.evade_timer, tunables.ai_evade_time);
        assert_eq!(target.best_prey, Some(1));
        let shooter = state.ships.get(1).unwrap();
        assert_eq!(shooter.stats.damage_dealt, 1.0);
        assert_eq!(shooter.stats.shots_hitting, 1);
        assert_eq!(state.shots.active_count(), 0);
        assert_eq!(state.sparks.live_count(), 1);
    }

    #[test]
    fn test_shot_out_of_reach() {
        let mut state = create_test_state(100.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        place_shot(&mut state, 1, Vec3::new(0.0, 6.1, 0.0));
        resolve_shots(&mut state, 0, &ctx(&tunables, &definition));
        assert_eq!(state.ships.get(0).unwrap().life, 100.0);
        assert_eq!(state.shots.active_count(), 1);
    }

    #[test]
    fn test_own_shots_never_hit() {
        let mut state = create_test_state(100.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        place_shot(&mut state, 0, Vec3::ZERO);
        resolve_shots(&mut state, 0, &ctx(&tunables, &definition));
        assert_eq!(state.ships.get(0).unwrap().life, 100.0);
    }

    #[test]
    fn test_humans_do_not_evade() {
        let mut state = create_test_state(100.0, true);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        place_shot(&mut state, 1, Vec3::ZERO);
        resolve_shots(&mut state, 0, &ctx(&tunables, &definition));
        let target = state.ships.get(0).unwrap();
        assert_eq!(target.evade_timer, 0.0);
        assert_eq!(target.best_prey, None);
    }

    #[test]
    fn test_shot_loop_stops_at_destruction() {
        let mut state = create_test_state(2.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        for _ in 0..3 {
            place_shot(&mut state, 1, Vec3::ZERO);
        }
        resolve_shots(&mut state, 0, &ctx(&tunables, &definition));
        assert_eq!(state.ships.get(0).unwrap().life, 0.0);
        assert_eq!(state.shots.active_count(), 1);
    }

    #[test]
    fn test_hundred_hits_destroy_once() {
        let mut state = create_test_state(100.0, true);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        let mut destroyed_at = None;
        for hit in 1..=101 {
            if !state.ships.is_valid(0) {
                break;
            }
            place_shot(&mut state, 1, Vec3::ZERO);
            resolve_shots(&mut state, 0, &ctx(&tunables, &definition));
            assert_eq!(state.ships.get(0).unwrap().life, 100.0 - hit as f32);
            if end_of_life(&mut state, 0, false) {
                assert!(destroyed_at.is_none());
                destroyed_at = Some(hit);
            }
        }
        assert_eq!(destroyed_at, Some(100));
        assert!(!end_of_life(&mut state, 0, false));
        assert_eq!(state.ships.get(1).unwrap().stats.kills, 1);
        let destroyed = state
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::ShipDestroyed { ship: 0, .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_missile_hits_only_its_target() {
        let mut state = create_test_state(100.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        state.missiles.launch(1, 0, Vec3::new(0.0, 0.0, 105.0), Quat::IDENTITY, None);
        state.missiles.launch(0, 1, Vec3::new(0.0, 0.0, 14.0), Quat::IDENTITY, None);
        resolve_missiles(&mut state, 0, &ctx(&tunables, &definition));
        assert_eq!(state.ships.get(0).unwrap().life, 80.0);
        assert_eq!(state.ships.get(0).unwrap().last_attacker, Some(1));
        assert_eq!(state.missiles.valid_count(), 1);
        assert!(state.missiles.get(0).unwrap().is_valid());
    }

    #[test]
    fn test_missile_threshold_is_exclusive() {
        let mut state = create_test_state(100.0, false);
        let (tunables, definition) = (Tunables::default(), GameDefinition::default());
        state
            .missiles
            .launch(0, 1, Vec3::new(0.0, 0.0, 200.0_f32.sqrt() + 0.01), Quat::IDENTITY, None);
        resolve_missiles(&mut state, 0, &ctx(&tunables, &definition));
        assert_eq!(state.ships.get(0).unwrap().life, 100.0);
    }

    #[test]
    fn test_asteroid_crash() {
        let mut state = create_test_state(100.0, false);
        state.field = AsteroidField::new(vec![Asteroid::from_parts(vec![
            SubSphere { center: Vec3::new(-1.0, 0.0, 0.0), radius: 2.0 },
            SubSphere { center: Vec3::new(1.0, 0.0, 0.0), radius: 2.0 },
        ])]);
        assert!(resolve_asteroids(&mut state, 0));
        assert_eq!(state.ships.get(0).unwrap().life, CRASH_LIFE);
        assert_eq!(state.crashes, [1, 0]);
        assert!(end_of_life(&mut state, 0, true));
        assert!(state.events.iter().any(|e| matches!(
            e,
            SimEvent::ShipDestroyed { ship: 0, killer: None, crashed: true }
        )));
        assert_eq!(state.explosions.live_count(), 1);
    }

    #[test]
    fn test_destroy_clears_handles() {
        let mut state = create_test_state(1.0, false);
        state.spawn_ship(Vec3::new(0.0, 0.0, -50.0), Quat::IDENTITY, Faction::Raider, false, 10.0);
        state.ships.get_mut(1).unwrap().best_prey = Some(0);
        state.ships.get_mut(2).unwrap().last_attacker = Some(0);
        place_shot(&mut state, 0, Vec3::new(500.0, 0.0, 0.0));
        state.missiles.launch(0, 1, Vec3::new(0.0, 0.0, 400.0), Quat::IDENTITY, None);
        state.missiles.launch(2, 0, Vec3::new(0.0, 0.0, 400.0), Quat::IDENTITY, None);
        state.ships.get_mut(0).unwrap().life = 0.0;

        assert!(end_of_life(&mut state, 0, false));
        assert_eq!(state.ships.get(1).unwrap().best_prey, None);
        assert_eq!(state.ships.get(2).unwrap().last_attacker, None);
        assert_eq!(state.shots.records()[0].fired_by, None);
        assert!(!state.missiles.get(0).unwrap().is_valid());
        assert_eq!(state.missiles.get(1).unwrap().fired_by, None);
        let ship = state.ships.get(0).unwrap();
        assert!(!ship.active);
        assert!(!ship.visible);
        assert!(ship.trail.is_none());
    }

    #[test]
    fn test_evade_point_is_perpendicular() {
        let point = evade_point(Vec3::ZERO, Vec3::X, Vec3::Z);
        assert!(point.dot(Vec3::Z).abs() < 1e-4);
        assert!((point.length() - EVADE_DISTANCE).abs() < 1e-2);
    }
}
