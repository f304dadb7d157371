//! Session state machine: Idle → Playing → Ended.
//!
//! The controller is single-threaded. Input and elapsed time arrive either as
//! direct method calls or as [`SessionEvent`] messages through
//! [`SessionController::handle`]; either way every transition runs to
//! completion before the next one starts. Timed processes (countdown,
//! relocation, post-hit respawn) live in a [`TimerQueue`] scope that exists
//! exactly as long as the Playing phase.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::arena::{self, ArenaGeometry, MeasuredArena};
use crate::best_score::BestScoreStore;
use crate::difficulty::{DifficultyLevel, DifficultyProfile};
use crate::session::{Phase, SessionState, TargetState};
use crate::timers::{Fired, ScopeId, TimerKind, TimerQueue};

pub const COUNTDOWN_PERIOD: Duration = Duration::from_millis(1000);
pub const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_millis(100);

/// Messages accepted by [`SessionController::handle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    ConfigureDifficulty(DifficultyLevel),
    Start,
    ResetToMenu,
    TargetClicked,
    Elapsed(Duration),
}

pub struct SessionController<S: BestScoreStore, A: ArenaGeometry = MeasuredArena> {
    state: SessionState,
    target: TargetState,
    best_score: u32,
    store: S,
    arena: A,
    timers: TimerQueue,
    playing: Option<ScopeId>,
    respawn_delay: Duration,
    rng: StdRng,
    placements: u64,
    sessions_played: u32,
    started_at: Duration,
}

impl<S: BestScoreStore, A: ArenaGeometry> SessionController<S, A> {
    /// Reads the best score from `store` once; it is only written back from here on.
    pub fn new(store: S, arena: A) -> Self {
        let best_score = store.read();
        log::info!("loaded best score {}", best_score);
        Self {
            state: SessionState::default(),
            target: TargetState::hidden(),
            best_score,
            store,
            arena,
            timers: TimerQueue::new(),
            playing: None,
            respawn_delay: DEFAULT_RESPAWN_DELAY,
            rng: StdRng::from_entropy(),
            placements: 0,
            sessions_played: 0,
            started_at: Duration::ZERO,
        }
    }

    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.configure_difficulty(level);
        self.state.time_left_secs = level.profile().session_duration_secs;
        self
    }

    pub fn with_respawn_delay(mut self, delay: Duration) -> Self {
        self.respawn_delay = delay;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.state.difficulty.profile()
    }

    pub fn respawn_delay(&self) -> Duration {
        self.respawn_delay
    }

    pub fn arena(&self) -> &A {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut A {
        &mut self.arena
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of successful target placements since construction
    pub fn placements(&self) -> u64 {
        self.placements
    }

    pub fn sessions_played(&self) -> u32 {
        self.sessions_played
    }

    /// Virtual time advanced so far
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ConfigureDifficulty(level) => self.configure_difficulty(level),
            SessionEvent::Start => self.start_session(),
            SessionEvent::ResetToMenu => self.reset_to_menu(),
            SessionEvent::TargetClicked => self.handle_target_click(),
            SessionEvent::Elapsed(dt) => self.advance(dt),
        }
    }

    pub fn configure_difficulty(&mut self, level: DifficultyLevel) {
        if self.state.phase != Phase::Idle {
            return;
        }
        self.state = SessionState {
            difficulty: level,
            ..self.state
        };
    }

    pub fn start_session(&mut self) {
        if self.state.phase == Phase::Playing {
            return;
        }

        let profile = self.profile();
        self.state = SessionState {
            score: 0,
            time_left_secs: profile.session_duration_secs,
            phase: Phase::Playing,
            difficulty: self.state.difficulty,
            new_best: false,
        };
        self.target = TargetState::hidden();

        let scope = self.timers.open_scope();
        self.timers.every(scope, TimerKind::Countdown, COUNTDOWN_PERIOD);
        self.timers
            .every(scope, TimerKind::Relocate, profile.relocation_interval());
        self.playing = Some(scope);
        self.started_at = self.timers.now();

        log::info!(
            "session started: difficulty={} duration={}s",
            self.state.difficulty,
            profile.session_duration_secs
        );

        self.place_target();
    }

    pub fn reset_to_menu(&mut self) {
        if self.state.phase == Phase::Playing {
            return;
        }
        self.leave_playing();
        self.state = SessionState::idle(self.state.difficulty);
        self.target = TargetState::hidden();
    }

    pub fn handle_target_click(&mut self) {
        if self.state.phase != Phase::Playing || !self.target.visible {
            return;
        }
        let Some(scope) = self.playing else {
            return;
        };

        self.state = SessionState {
            score: self.state.score + 1,
            ..self.state
        };
        self.target = TargetState {
            visible: false,
            ..self.target
        };
        self.timers.after(scope, TimerKind::Respawn, self.respawn_delay);
    }

    pub fn end_session(&mut self) {
        if self.state.phase != Phase::Playing {
            return;
        }
        self.leave_playing();

        let previous_best = self.best_score;
        let new_best = self.state.score > previous_best;
        self.state = SessionState {
            phase: Phase::Ended,
            new_best,
            ..self.state
        };
        self.target = TargetState::hidden();
        self.sessions_played += 1;

        if new_best {
            self.best_score = self.state.score;
            if let Err(e) = self.store.write(self.best_score) {
                log::warn!("failed to persist best score {}: {}", self.best_score, e);
            }
            log::info!("new best score {} (was {})", self.best_score, previous_best);
        }

        let elapsed = self.timers.now().saturating_sub(self.started_at).as_secs_f64();
        let hits_per_sec = if elapsed > 0.0 {
            self.state.score as f64 / elapsed
        } else {
            0.0
        };
        log::info!(
            "session {} ended: score={} difficulty={} hits/s={:.2}",
            self.sessions_played,
            self.state.score,
            self.state.difficulty,
            hits_per_sec
        );
    }

    /// Advance virtual time by `elapsed`, firing every timer that comes due in deadline order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some(fired) = self.timers.pop_due(until) {
            self.on_timer(fired);
        }
        self.timers.settle(until);
    }

    fn on_timer(&mut self, fired: Fired) {
        if self.playing != Some(fired.scope) || !self.timers.is_open(fired.scope) {
            return;
        }
        log::debug!("{:?} fired at {:?}", fired.kind, fired.at);

        match fired.kind {
            TimerKind::Countdown => self.countdown_tick(),
            TimerKind::Relocate | TimerKind::Respawn => {
                self.place_target();
            }
        }
    }

    fn countdown_tick(&mut self) {
        if self.state.phase != Phase::Playing {
            return;
        }
        self.state = SessionState {
            time_left_secs: self.state.time_left_secs.saturating_sub(1),
            ..self.state
        };
        if self.state.time_left_secs == 0 {
            self.end_session();
        }
    }

    /// Returns whether a new position was drawn.
    fn place_target(&mut self) -> bool {
        if self.state.phase != Phase::Playing {
            return false;
        }
        let profile = self.profile();
        match arena::place_target(&mut self.rng, self.arena.dimensions(), &profile) {
            Some(position) => {
                self.target = TargetState::shown_at(position);
                self.placements += 1;
                log::debug!("target placed at ({:.1}, {:.1})", position.x, position.y);
                true
            }
            None => {
                log::debug!("arena not measured yet, placement deferred");
                false
            }
        }
    }

    fn leave_playing(&mut self) {
        if let Some(scope) = self.playing.take() {
            self.timers.close_scope(scope);
        }
    }
}
