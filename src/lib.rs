// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod arena;
pub mod best_score;
pub mod celebration;
pub mod config;
pub mod controller;
pub mod difficulty;
pub mod runtime;
pub mod session;
pub mod timers;

pub use controller::{SessionController, SessionEvent};
pub use difficulty::{DifficultyLevel, DifficultyProfile};
pub use session::{Phase, SessionState, TargetState};
