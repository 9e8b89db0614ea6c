//! Gameplay tuning parameters
//!
//! Every parameter is listed once in [`TUNABLES`], an ordered table of
//! descriptors that parameter editors iterate instead of inspecting the
//! struct. The table also drives text export and import.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning values shared by every ship of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Velocity at which the speed ratio saturates
    pub max_speed: f32,
    /// Base acceleration per frame
    pub max_accel: f32,
    /// Delay between two missile launches (ms)
    pub missile_cooldown_time: f32,
    /// Mouse steering sensitivity
    pub mouse_sensitivity: f32,
    /// Time a target must be held before a missile can lock (ms)
    pub time_to_lock_missile: f32,
    /// Maximum steering delta accepted from a human
    pub player_turn_rate: f32,
    /// Length of the Immelmann maneuver (ms)
    pub immelmann_duration: f32,
    pub ai_perception_cone: f32,
    /// Stand-off distance behind the chased ship (negative is behind)
    pub ai_follow_distance: f32,
    /// Lead factor applied to target velocity when aiming
    pub ai_prediction_range: f32,
    pub ai_turn_rate: f32,
    /// Random steering noise added every frame
    pub ai_input_randomness: f32,
    pub ai_fire_precision: f32,
    pub ai_friendly_fire_precision: f32,
    /// Evade duration after being hit (ms)
    pub ai_evade_time: f32,
    pub ai_minimum_speed: f32,
    pub ai_maximum_speed: f32,
    pub ai_fire_range: f32,
    pub ai_break_distance: f32,
    pub ai_burst_distance: f32,
    /// Maximum number of AI ships chasing the same prey
    pub ai_max_targets: u32,
    pub ai_immelmann_probability: f32,
    /// AI allies spawned when no game definition is supplied
    pub ally_count: u32,
    /// AI enemies spawned when no game definition is supplied
    pub enemy_count: u32,
    /// Recorder capacity in frames
    pub record_frame_count: u32,
    pub recorder_active: bool,
    /// Emit audio cue events
    pub enable_audio: bool,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            max_accel: 0.003,
            missile_cooldown_time: 10_000.0,
            mouse_sensitivity: 0.0003,
            time_to_lock_missile: 2000.0,
            player_turn_rate: 0.04,
            immelmann_duration: 1000.0,
            ai_perception_cone: -0.5,
            ai_follow_distance: -10.0,
            ai_prediction_range: 2.0,
            ai_turn_rate: 0.04,
            ai_input_randomness: 0.0,
            ai_fire_precision: 0.98,
            ai_friendly_fire_precision: 0.97,
            ai_evade_time: 3000.0,
            ai_minimum_speed: 1.0,
            ai_maximum_speed: 5.0,
            ai_fire_range: 550.0,
            ai_break_distance: 30.0,
            ai_burst_distance: 500.0,
            ai_max_targets: 4,
            ai_immelmann_probability: 0.2,
            ally_count: 10,
            enemy_count: 10,
            record_frame_count: 2000,
            recorder_active: true,
            enable_audio: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TunableKind {
    Float,
    Int,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TunableValue {
    Float(f32),
    Int(u32),
    Bool(bool),
}

impl TunableValue {
    pub fn kind(&self) -> TunableKind {
        match self {
            TunableValue::Float(_) => TunableKind::Float,
            TunableValue::Int(_) => TunableKind::Int,
            TunableValue::Bool(_) => TunableKind::Bool,
        }
    }

    fn as_f32(self) -> f32 {
        match self {
            TunableValue::Float(v) => v,
            TunableValue::Int(v) => v as f32,
            TunableValue::Bool(v) => f32::from(u8::from(v)),
        }
    }

    fn as_u32(self) -> u32 {
        match self {
            TunableValue::Float(v) => v.max(0.0) as u32,
            TunableValue::Int(v) => v,
            TunableValue::Bool(v) => u32::from(v),
        }
    }

    fn as_bool(self) -> bool {
        match self {
            TunableValue::Float(v) => v != 0.0,
            TunableValue::Int(v) => v != 0,
            TunableValue::Bool(v) => v,
        }
    }
}

impl std::fmt::Display for TunableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunableValue::Float(v) => write!(f, "{}", v),
            TunableValue::Int(v) => write!(f, "{}", v),
            TunableValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// One entry of the registration table
pub struct TunableDescriptor {
    pub name: &'static str,
    pub kind: TunableKind,
    pub get: fn(&Tunables) -> TunableValue,
    pub set: fn(&mut Tunables, TunableValue),
}

impl std::fmt::Debug for TunableDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunableDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TunableError {
    #[error("unknown parameter '{0}'")]
    UnknownName(String),
    #[error("parameter '{name}' expects {expected:?}, got {got:?}")]
    KindMismatch {
        name: String,
        expected: TunableKind,
        got: TunableKind,
    },
    #[error("cannot parse '{value}' for parameter '{name}'")]
    Parse { name: String, value: String },
    #[error("malformed line {line}: '{text}'")]
    Malformed { line: usize, text: String },
}

macro_rules! float_tunable {
    ($name:literal, $field:ident) => {
        TunableDescriptor {
            name: $name,
            kind: TunableKind::Float,
            get: |t| TunableValue::Float(t.$field),
            set: |t, v| t.$field = v.as_f32(),
        }
    };
}

macro_rules! int_tunable {
    ($name:literal, $field:ident) => {
        TunableDescriptor {
            name: $name,
            kind: TunableKind::Int,
            get: |t| TunableValue::Int(t.$field),
            set: |t, v| t.$field = v.as_u32(),
        }
    };
}

macro_rules! bool_tunable {
    ($name:literal, $field:ident) => {
        TunableDescriptor {
            name: $name,
            kind: TunableKind::Bool,
            get: |t| TunableValue::Bool(t.$field),
            set: |t, v| t.$field = v.as_bool(),
        }
    };
}

/// Registration table, in editor display order
pub const TUNABLES: &[TunableDescriptor] = &[
    float_tunable!("maxSpeed", max_speed),
    float_tunable!("maxAccel", max_accel),
    float_tunable!("missileCoolDownTime", missile_cooldown_time),
    float_tunable!("mouseSensitivity", mouse_sensitivity),
    float_tunable!("timeToLockMissile", time_to_lock_missile),
    float_tunable!("playerTurnRate", player_turn_rate),
    float_tunable!("ImmelmannDuration", immelmann_duration),
    float_tunable!("AIPerceptionCone", ai_perception_cone),
    float_tunable!("AIFollowDistance", ai_follow_distance),
    float_tunable!("AIPredictionRange", ai_prediction_range),
    float_tunable!("AITurnRate", ai_turn_rate),
    float_tunable!("AIInputRandomness", ai_input_randomness),
    float_tunable!("AIFirePrecision", ai_fire_precision),
    float_tunable!("AIFriendlyFirePrecision", ai_friendly_fire_precision),
    float_tunable!("AIEvadeTime", ai_evade_time),
    float_tunable!("AIMinimumSpeed", ai_minimum_speed),
    float_tunable!("AIMaximumSpeed", ai_maximum_speed),
    float_tunable!("AIFireRange", ai_fire_range),
    float_tunable!("AIBreakDistance", ai_break_distance),
    float_tunable!("AIBurstDistance", ai_burst_distance),
    int_tunable!("AIMaxTargets", ai_max_targets),
    float_tunable!("AIImmelmannProbability", ai_immelmann_probability),
    int_tunable!("allyCount", ally_count),
    int_tunable!("enemyCount", enemy_count),
    int_tunable!("recordFrameCount", record_frame_count),
    bool_tunable!("recorderActive", recorder_active),
    bool_tunable!("enableAudio", enable_audio),
];

/// Int values are accepted where a float is expected, nothing else converts.
fn accepts(expected: TunableKind, got: TunableKind) -> bool {
    expected == got || (expected == TunableKind::Float && got == TunableKind::Int)
}

impl Tunables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(name: &str) -> Option<&'static TunableDescriptor> {
        TUNABLES.iter().find(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Result<TunableValue, TunableError> {
        let descriptor =
            Self::descriptor(name).ok_or_else(|| TunableError::UnknownName(name.to_string()))?;
        Ok((descriptor.get)(self))
    }

    pub fn set(&mut self, name: &str, value: TunableValue) -> Result<(), TunableError> {
        let descriptor =
            Self::descriptor(name).ok_or_else(|| TunableError::UnknownName(name.to_string()))?;
        if !accepts(descriptor.kind, value.kind()) {
            return Err(TunableError::KindMismatch {
                name: name.to_string(),
                expected: descriptor.kind,
                got: value.kind(),
            });
        }
        (descriptor.set)(self, value);
        Ok(())
    }

    /// Parse `raw` according to the parameter's kind and assign it.
    pub fn set_from_str(&mut self, name: &str, raw: &str) -> Result<(), TunableError> {
        let descriptor =
            Self::descriptor(name).ok_or_else(|| TunableError::UnknownName(name.to_string()))?;
        let raw = raw.trim();
        let parse_error = || TunableError::Parse {
            name: name.to_string(),
            value: raw.to_string(),
        };
        let value = match descriptor.kind {
            TunableKind::Float => TunableValue::Float(raw.parse().map_err(|_| parse_error())?),
            TunableKind::Int => TunableValue::Int(raw.parse().map_err(|_| parse_error())?),
            TunableKind::Bool => TunableValue::Bool(raw.parse().map_err(|_| parse_error())?),
        };
        (descriptor.set)(self, value);
        Ok(())
    }

    /// Export every parameter as `name = value` lines, in table order.
    pub fn generate_code(&self) -> String {
        let mut out = String::new();
        for descriptor in TUNABLES {
            out.push_str(descriptor.name);
            out.push_str(" = ");
            out.push_str(&(descriptor.get)(self).to_string());
            out.push('\n');
        }
        out
    }

    /// Apply `name = value` lines produced by [`Tunables::generate_code`].
    ///
    /// Blank lines and lines starting with `#` are skipped. Stops at the
    /// first invalid line; earlier lines stay applied.
    pub fn apply_code(&mut self, code: &str) -> Result<usize, TunableError> {
        let mut applied = 0;
        for (index, line) in code.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = line.split_once('=').ok_or_else(|| TunableError::Malformed {
                line: index + 1,
                text: line.to_string(),
            })?;
            self.set_from_str(name.trim(), value.trim_end_matches(';'))?;
            applied += 1;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Tunables::default();
        assert_eq!(t.max_speed, 2.0);
        assert_eq!(t.ai_max_targets, 4);
        assert_eq!(t.record_frame_count, 2000);
        assert!(t.recorder_active);
    }

    #[test]
    fn test_table_names_are_unique() {
        for (i, a) in TUNABLES.iter().enumerate() {
            for b in &TUNABLES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_get_and_set_by_name() {
        let mut t = Tunables::default();
        t.set("AITurnRate", TunableValue::Float(0.08)).unwrap();
        assert_eq!(t.ai_turn_rate, 0.08);
        assert_eq!(t.get("AITurnRate").unwrap(), TunableValue::Float(0.08));

        t.set("AIMaxTargets", TunableValue::Int(2)).unwrap();
        assert_eq!(t.ai_max_targets, 2);
    }

    #[test]
    fn test_int_accepted_for_float() {
        let mut t = Tunables::default();
        t.set("maxSpeed", TunableValue::Int(3)).unwrap();
        assert_eq!(t.max_speed, 3.0);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut t = Tunables::default();
        let err = t.set("recorderActive", TunableValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, TunableError::KindMismatch { .. }));
        assert!(t.recorder_active);
    }

    #[test]
    fn test_unknown_name() {
        let t = Tunables::default();
        assert_eq!(
            t.get("warpFactor").unwrap_err(),
            TunableError::UnknownName("warpFactor".to_string())
        );
    }

    #[test]
    fn test_generate_code_round_trip() {
        let mut source = Tunables::default();
        source.ai_fire_range = 700.0;
        source.enable_audio = false;
        source.enemy_count = 3;
        let code = source.generate_code();
        assert!(code.contains("AIFireRange = 700\n"));
        assert_eq!(code.lines().count(), TUNABLES.len());

        let mut target = Tunables::default();
        assert_eq!(target.apply_code(&code).unwrap(), TUNABLES.len());
        assert_eq!(target, source);
    }

    #[test]
    fn test_apply_code_reports_bad_line() {
        let mut t = Tunables::default();
        let err = t.apply_code("maxSpeed = 4\nnonsense\n").unwrap_err();
        assert_eq!(
            err,
            TunableError::Malformed {
                line: 2,
                text: "nonsense".to_string()
            }
        );
        assert_eq!(t.max_speed, 4.0);
    }
}
