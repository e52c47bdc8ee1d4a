//! Single-slot cancellable scheduler for the auto-advance delay.
use serde::{Deserialize, Serialize};

/// Why the session is waiting to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceReason {
    LevelCleared,
    TimedOut,
}

/// Opaque identity of one scheduled advance. Never reused within a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// An outstanding scheduled advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAdvance {
    pub handle: TimerHandle,
    pub reason: AdvanceReason,
    pub due_at_ms: u64,
}

/// Holds at most one pending advance; scheduling replaces, cancelling clears.
#[derive(Debug, Clone, Default)]
pub struct AdvanceTimer {
    issued: u64,
    pending: Option<PendingAdvance>,
}

impl AdvanceTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an advance `delay_ms` after `now_ms`, replacing any pending one.
    pub fn schedule(&mut self, reason: AdvanceReason, now_ms: u64, delay_ms: u64) -> TimerHandle {
        self.issued = self.issued.wrapping_add(1);
        let handle = TimerHandle(self.issued);
        self.pending = Some(PendingAdvance {
            handle,
            reason,
            due_at_ms: now_ms.saturating_add(delay_ms),
        });
        handle
    }

    /// Drop the pending advance, if any.
    pub fn cancel(&mut self) -> Option<PendingAdvance> {
        self.pending.take()
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&PendingAdvance> {
        self.pending.as_ref()
    }

    /// Whether `handle` is the advance still waiting to fire.
    #[must_use]
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.pending.is_some_and(|p| p.handle == handle)
    }

    /// Milliseconds until the pending advance is due.
    #[must_use]
    pub fn due_in(&self, now_ms: u64) -> Option<u64> {
        self.pending.map(|p| p.due_at_ms.saturating_sub(now_ms))
    }

    /// Remove and return the pending advance once `now_ms` reaches its due time.
    pub fn take_due(&mut self, now_ms: u64) -> Option<PendingAdvance> {
        match self.pending {
            Some(p) if p.due_at_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }
}
