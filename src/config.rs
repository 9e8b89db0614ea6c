use std::path::PathBuf;

/// Headless runner configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Frames to simulate before giving up on a winner
    pub frames: u32,
    /// Host frame delta in milliseconds
    pub frame_ms: f32,
    /// JSON mission list to pick the battle from
    pub mission_file: Option<PathBuf>,
    /// Mission name inside `mission_file`; the first mission when unset
    pub mission: Option<String>,
    /// Overrides the mission seed
    pub seed: Option<u64>,
    /// Overrides the recorder capacity
    pub record_frames: Option<u32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frames: 3600,
            frame_ms: 1000.0 / 60.0,
            mission_file: None,
            mission: None,
            seed: None,
            record_frames: None,
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(frames) = std::env::var("SIM_FRAMES") {
            match frames.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.frames = parsed,
                Ok(_) => tracing::warn!("SIM_FRAMES must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid SIM_FRAMES '{}', using default", frames),
            }
        }

        if let Ok(frame_ms) = std::env::var("SIM_FRAME_MS") {
            match frame_ms.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed <= 1000.0 => config.frame_ms = parsed,
                Ok(_) => tracing::warn!("SIM_FRAME_MS must be in (0, 1000], using default"),
                Err(_) => tracing::warn!("Invalid SIM_FRAME_MS '{}', using default", frame_ms),
            }
        }

        if let Ok(path) = std::env::var("SIM_MISSION_FILE") {
            config.mission_file = Some(PathBuf::from(path));
        }

        if let Ok(name) = std::env::var("SIM_MISSION") {
            config.mission = Some(name);
        }

        if let Ok(seed) = std::env::var("SIM_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid SIM_SEED '{}', keeping the mission seed", seed);
            }
        }

        if let Ok(frames) = std::env::var("SIM_RECORD_FRAMES") {
            if let Ok(parsed) = frames.parse::<u32>() {
                config.record_frames = Some(parsed);
            } else {
                tracing::warn!("Invalid SIM_RECORD_FRAMES '{}', using default", frames);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.frames == 0 {
            return Err("frames must be at least 1".to_string());
        }
        if !(self.frame_ms > 0.0) {
            return Err("frame_ms must be positive".to_string());
        }
        if self.mission.is_some() && self.mission_file.is_none() {
            return Err("SIM_MISSION needs SIM_MISSION_FILE".to_string());
        }
        Ok(())
    }
}
