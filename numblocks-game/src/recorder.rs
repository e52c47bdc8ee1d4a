//! End-of-session reporting to the host platform.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use crate::constants::GAME_ID;

/// Summary recorded exactly once when a session reaches `SessionComplete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub game_id: String,
    pub final_score: u32,
    pub best_streak: u32,
    pub duration_seconds: u64,
    /// True only when the final level was cleared rather than timed out.
    pub completed: bool,
}

impl SessionSummary {
    #[must_use]
    pub fn new(final_score: u32, best_streak: u32, duration_seconds: u64, completed: bool) -> Self {
        Self {
            game_id: GAME_ID.to_string(),
            final_score,
            best_streak,
            duration_seconds,
            completed,
        }
    }
}

/// Trait for persisting session results.
/// Platform-specific implementations should provide this.
pub trait SessionRecorder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record one finished session.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects or cannot store the summary.
    fn record(&self, summary: &SessionSummary) -> Result<(), Self::Error>;
}

impl<R: SessionRecorder + ?Sized> SessionRecorder for &R {
    type Error = R::Error;

    fn record(&self, summary: &SessionSummary) -> Result<(), Self::Error> {
        (**self).record(summary)
    }
}

/// Discards every summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl SessionRecorder for NullRecorder {
    type Error = Infallible;

    fn record(&self, _summary: &SessionSummary) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// In-memory recorder; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    entries: Rc<RefCell<Vec<SessionSummary>>>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<SessionSummary> {
        self.entries.borrow().last().cloned()
    }
}

impl SessionRecorder for MemoryRecorder {
    type Error = Infallible;

    fn record(&self, summary: &SessionSummary) -> Result<(), Self::Error> {
        self.entries.borrow_mut().push(summary.clone());
        Ok(())
    }
}
