//! Battle configuration and mission lists
//!
//! `GameDefinition` uses the camelCase keys of the mission JSON files so a
//! mission entry can be deserialized as-is. Missing keys take defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::tunables::Tunables;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("battle needs at least one ship")]
    NoShips,
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("mission '{0}' not found")]
    UnknownMission(String),
    #[error("invalid mission JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Battle setup: fleet sizes, lives, damage and arena limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameDefinition {
    pub human_allies: u32,
    pub human_enemies: u32,
    pub ai_allies: u32,
    pub ai_enemies: u32,
    /// Seeds the asteroid field and every AI random draw
    pub seed: u64,
    pub asteroid_count: u32,
    /// Edge length of the cube asteroids are scattered in
    pub asteroid_radius: f32,
    pub human_allies_life: f32,
    pub human_enemies_life: f32,
    pub ai_allies_life: f32,
    pub ai_enemies_life: f32,
    pub shot_damage: f32,
    pub missile_damage: f32,
    /// Seconds between the end condition and game over
    pub delayed_end: f32,
    /// AI ships turn back beyond this distance from the origin
    pub enemy_boundary_radius: f32,
    /// Human ships are kept inside this distance from the origin
    pub human_boundary_radius: f32,
}

impl Default for GameDefinition {
    fn default() -> Self {
        Self {
            human_allies: 0,
            human_enemies: 0,
            ai_allies: 0,
            ai_enemies: 0,
            seed: 2022,
            asteroid_count: 20,
            asteroid_radius: 1000.0,
            human_allies_life: 100.0,
            human_enemies_life: 100.0,
            ai_allies_life: 50.0,
            ai_enemies_life: 10.0,
            shot_damage: 1.0,
            missile_damage: 20.0,
            delayed_end: 0.0,
            enemy_boundary_radius: 400.0,
            human_boundary_radius: 800.0,
        }
    }
}

impl GameDefinition {
    /// Skirmish used when no mission was picked: one human pilot against the
    /// AI fleets sized by the tunables.
    pub fn skirmish(tunables: &Tunables) -> Self {
        Self {
            human_allies: 1,
            ai_allies: tunables.ally_count,
            ai_enemies: tunables.enemy_count,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Total ship slots needed by this battle
    pub fn max_ships(&self) -> usize {
        (self.human_allies + self.human_enemies + self.ai_allies + self.ai_enemies) as usize
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.max_ships() == 0 {
            return Err(DefinitionError::NoShips);
        }
        let positive = [
            ("humanAlliesLife", self.human_allies_life),
            ("humanEnemiesLife", self.human_enemies_life),
            ("aiAlliesLife", self.ai_allies_life),
            ("aiEnemiesLife", self.ai_enemies_life),
            ("enemyBoundaryRadius", self.enemy_boundary_radius),
            ("humanBoundaryRadius", self.human_boundary_radius),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(DefinitionError::NotPositive { field, value });
            }
        }
        let non_negative = [
            ("asteroidRadius", self.asteroid_radius),
            ("shotDamage", self.shot_damage),
            ("missileDamage", self.missile_damage),
            ("delayedEnd", self.delayed_end),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(DefinitionError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// One selectable scenario of a mission file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub game_definition: GameDefinition,
}

/// Mission file contents: a JSON array of missions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionList {
    pub missions: Vec<Mission>,
}

impl MissionList {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let list: Self = serde_json::from_str(json)?;
        for mission in &list.missions {
            mission.game_definition.validate()?;
        }
        Ok(list)
    }

    pub fn find(&self, name: &str) -> Result<&Mission, DefinitionError> {
        self.missions
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| DefinitionError::UnknownMission(name.to_string()))
    }
}
