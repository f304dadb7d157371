//! Virtual-clock timer queue for the session controller.
//!
//! Nothing here sleeps or spawns threads: the owner advances the clock and
//! pulls due timers out one at a time. Every timer belongs to a [`ScopeId`];
//! closing a scope drops its timers, and a closed scope never fires again.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-second countdown
    Countdown,
    /// Periodic target relocation
    Relocate,
    /// One-shot placement after a hit
    Respawn,
}

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub kind: TimerKind,
    pub scope: ScopeId,
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Timer {
    seq: u64,
    kind: TimerKind,
    scope: ScopeId,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    next_scope: u64,
    open_scope: Option<ScopeId>,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Open a fresh scope, closing (and cancelling) any scope still open
    pub fn open_scope(&mut self) -> ScopeId {
        if let Some(old) = self.open_scope {
            self.close_scope(old);
        }
        let scope = ScopeId(self.next_scope);
        self.next_scope += 1;
        self.open_scope = Some(scope);
        scope
    }

    pub fn close_scope(&mut self, scope: ScopeId) {
        self.timers.retain(|t| t.scope != scope);
        if self.open_scope == Some(scope) {
            self.open_scope = None;
        }
    }

    pub fn is_open(&self, scope: ScopeId) -> bool {
        self.open_scope == Some(scope)
    }

    pub fn every(&mut self, scope: ScopeId, kind: TimerKind, period: Duration) {
        self.push(scope, kind, period, Some(period));
    }

    pub fn after(&mut self, scope: ScopeId, kind: TimerKind, delay: Duration) {
        self.push(scope, kind, delay, None);
    }

    fn push(
        &mut self,
        scope: ScopeId,
        kind: TimerKind,
        delay: Duration,
        period: Option<Duration>,
    ) {
        if !self.is_open(scope) {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            seq,
            kind,
            scope,
            due: self.now + delay,
            period,
        });
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_of(&self, kind: TimerKind) -> usize {
        self.timers.iter().filter(|t| t.kind == kind).count()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its deadline.
    ///
    /// Periodic timers are re-armed before being returned. Ties fire in the
    /// order they were scheduled.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;

        let due = self.timers[idx].due;
        self.now = self.now.max(due);

        let fired = match self.timers[idx].period {
            Some(period) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let timer = &mut self.timers[idx];
                timer.due += period;
                timer.seq = seq;
                Fired {
                    kind: timer.kind,
                    scope: timer.scope,
                    at: due,
                }
            }
            None => {
                let timer = self.timers.remove(idx);
                Fired {
                    kind: timer.kind,
                    scope: timer.scope,
                    at: due,
                }
            }
        };

        Some(fired)
    }

    /// Move the clock forward once every due timer has been popped
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
