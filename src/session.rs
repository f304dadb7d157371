use crate::arena::Position;
use crate::difficulty::DifficultyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionState {
    pub score: u32,
    pub time_left_secs: u32,
    pub phase: Phase,
    pub difficulty: DifficultyLevel,
    /// Set on entering Ended when the final score beat the previous best,
    /// which implies a score of at least 1
    pub new_best: bool,
}

impl SessionState {
    /// Fresh pre-session state for `difficulty`
    pub fn idle(difficulty: DifficultyLevel) -> Self {
        Self {
            score: 0,
            time_left_secs: difficulty.profile().session_duration_secs,
            phase: Phase::Idle,
            difficulty,
            new_best: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle(DifficultyLevel::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetState {
    pub position: Position,
    pub visible: bool,
}

impl TargetState {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn shown_at(position: Position) -> Self {
        Self {
            position,
            visible: true,
        }
    }
}
