//! Rolling detection window.
//!
//! Successful cycles produce contiguous, non-overlapping windows: each one
//! starts exactly where the previous one ended. A failed cycle restores the
//! snapshot taken before it advanced, so the same window is retried.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Time range examined by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Shift both bounds back by `offset`.
    #[must_use]
    pub fn shifted_back(self, offset: Duration) -> Self {
        Self {
            start: self.start - offset,
            end: self.end - offset,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Watermark state owned by the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    last_window_end: Option<DateTime<Utc>>,
    window_start: Option<DateTime<Utc>>,
    window_end: Option<DateTime<Utc>>,
}

impl WindowState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the window ending at `now`.
    ///
    /// The first window reaches back `initial_lookback`; every later one
    /// starts at the previous end.
    pub fn advance(&mut self, now: DateTime<Utc>, initial_lookback: Duration) -> Window {
        let end = now;
        let start = self.last_window_end.unwrap_or(end - initial_lookback);

        self.window_start = Some(start);
        self.window_end = Some(end);
        self.last_window_end = Some(end);

        Window { start, end }
    }

    /// Copy of the current state for rollback.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        *self
    }

    /// Restore a snapshot taken before a failed cycle.
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }

    #[must_use]
    pub fn last_window_end(&self) -> Option<DateTime<Utc>> {
        self.last_window_end
    }

    /// The window of the latest advance, if any.
    #[must_use]
    pub fn current(&self) -> Option<Window> {
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => Some(Window { start, end }),
            _ => None,
        }
    }
}
