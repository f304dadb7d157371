use std::time::Duration;

/// Difficulty chosen in the menu before a session starts
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Fixed numeric parameters for a difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub relocation_interval_ms: u64,
    pub target_size_px: u32,
    pub session_duration_secs: u32,
}

impl DifficultyProfile {
    pub fn relocation_interval(&self) -> Duration {
        Duration::from_millis(self.relocation_interval_ms)
    }
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn profile(&self) -> DifficultyProfile {
        resolve_profile(*self)
    }

    /// Parse a level name; anything unrecognised falls back to medium
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "easy" => DifficultyLevel::Easy,
            "hard" => DifficultyLevel::Hard,
            _ => DifficultyLevel::Medium,
        }
    }
}

pub fn resolve_profile(level: DifficultyLevel) -> DifficultyProfile {
    match level {
        DifficultyLevel::Easy => DifficultyProfile {
            relocation_interval_ms: 2000,
            target_size_px: 80,
            session_duration_secs: 45,
        },
        DifficultyLevel::Medium => DifficultyProfile {
            relocation_interval_ms: 1500,
            target_size_px: 60,
            session_duration_secs: 30,
        },
        DifficultyLevel::Hard => DifficultyProfile {
            relocation_interval_ms: 1000,
            target_size_px: 40,
            session_duration_secs: 20,
        },
    }
}
