//! Deferred power-up reverts
//!
//! Single-shot timers keyed by kind, measured in wall-clock milliseconds so
//! effect durations do not depend on frame rate. Scheduling a kind replaces
//! any pending timer of that kind; the tick applies due timers itself.

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ExpandRevert,
    MegaRevert,
}

/// Scheduling order; breaks ties between timers due at the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimerToken(u64);

#[derive(Debug, Clone, PartialEq)]
struct Scheduled {
    kind: TimerKind,
    due_ms: f64,
    token: TimerToken,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timers {
    pending: Vec<Scheduled>,
    next_token: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `due_ms`, cancelling any pending one
    pub fn schedule(&mut self, kind: TimerKind, due_ms: f64) {
        if self.cancel(kind) {
            log::debug!("Rescheduling {:?}", kind);
        }
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Scheduled { kind, due_ms, token });
    }

    /// Cancel the pending timer of `kind`; returns whether one existed
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.kind != kind);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    pub fn due_at(&self, kind: TimerKind) -> Option<f64> {
        self.pending.iter().find(|t| t.kind == kind).map(|t| t.due_ms)
    }

    /// Remove and return every timer due at `now_ms`, in firing order
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerKind> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|t| {
            if t.due_ms <= now_ms {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.token.cmp(&b.token)));
        due.into_iter().map(|t| t.kind).collect()
    }
}
