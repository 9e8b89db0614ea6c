//! Battle outcome and report
//!
//! Decides when a battle is over and summarises the per-ship statistics.

use serde::Serialize;

use crate::game::ship::{Faction, ShipId, ShipPool};
use crate::game::state::SimState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Every enemy ship is gone while a human still flies
    Victory,
    /// No human ship is left
    Defeat,
}

/// Victory/defeat check with a grace period
///
/// Once the battle is decided the outcome is only reported after
/// `delayed_end` seconds of real time, so the last explosion can play out.
#[derive(Debug, Clone)]
pub struct VictoryCheck {
    delayed_end: f32,
    outcome: Option<Outcome>,
}

impl VictoryCheck {
    pub fn new(delayed_end: f32) -> Self {
        Self {
            delayed_end,
            outcome: None,
        }
    }

    /// Outcome reported so far
    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Run once per frame with the unscaled frame time in seconds.
    ///
    /// Returns the outcome on the frame the battle ends, `None` before and
    /// after.
    pub fn check(&mut self, ships: &ShipPool, real_dt: f32) -> Option<Outcome> {
        if self.outcome.is_some() {
            return None;
        }
        let decided = decide(ships)?;
        if self.delayed_end <= 0.0 {
            self.outcome = Some(decided);
            return self.outcome;
        }
        self.delayed_end -= real_dt;
        None
    }
}

/// Outcome the battle would have right now, ignoring the grace period
pub fn decide(ships: &ShipPool) -> Option<Outcome> {
    let human_alive = ships.human().is_some();
    if !human_alive {
        Some(Outcome::Defeat)
    } else if ships.valid_in_faction(Faction::Raider) == 0 {
        Some(Outcome::Victory)
    } else {
        None
    }
}

/// One line of the battle report
#[derive(Debug, Clone, Serialize)]
pub struct ShipRanking {
    pub ship: ShipId,
    pub faction: Faction,
    pub is_human: bool,
    pub rank: u32,
    pub survived: bool,
    pub kills: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub accuracy: f32,
    pub missiles_fired: u32,
    pub time_of_battle: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub outcome: Option<Outcome>,
    pub rankings: Vec<ShipRanking>,
    /// Scaled milliseconds simulated
    pub battle_time: f32,
    pub total_kills: u32,
    /// Asteroid crashes per faction
    pub crashes: [u32; 2],
}

impl BattleReport {
    /// Best ranked human pilot
    pub fn best_human(&self) -> Option<&ShipRanking> {
        self.rankings.iter().find(|r| r.is_human)
    }
}

/// Rank every ship that took part in the battle.
pub fn determine_result(state: &SimState, outcome: Option<Outcome>) -> BattleReport {
    let mut rankings: Vec<ShipRanking> = state
        .ships
        .iter()
        .enumerate()
        .filter(|(_, s)| s.stats.time_of_battle > 0.0 || s.is_valid())
        .map(|(id, s)| ShipRanking {
            ship: id,
            faction: s.faction,
            is_human: s.is_human,
            rank: 0,
            survived: s.is_valid(),
            kills: s.stats.kills,
            damage_dealt: s.stats.damage_dealt,
            damage_taken: s.stats.damage_taken,
            accuracy: s.stats.accuracy(),
            missiles_fired: s.stats.missiles_fired,
            time_of_battle: s.stats.time_of_battle,
        })
        .collect();

    // Sort by: survived (desc), kills (desc), damage dealt (desc)
    rankings.sort_by(|a, b| {
        b.survived
            .cmp(&a.survived)
            .then_with(|| b.kills.cmp(&a.kills))
            .then_with(|| {
                b.damage_dealt
                    .partial_cmp(&a.damage_dealt)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = (i + 1) as u32;
    }

    let total_kills = rankings.iter().map(|r| r.kills).sum();
    BattleReport {
        outcome,
        rankings,
        battle_time: state.time,
        total_kills,
        crashes: state.crashes,
    }
}
