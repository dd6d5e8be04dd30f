//! Fixed-delay cycle driver with rollback and backoff.
//!
//! The scheduler owns the [`WindowState`]. Each cycle snapshots it,
//! advances it to `now`, and runs the pipeline. A failed cycle restores the
//! snapshot and switches to [`SchedulerState::Backoff`], so the next cycle
//! retries the same window start once the backoff deadline has passed.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use super::pipeline::{CycleReport, DetectionPipeline};
use crate::domain::WindowState;
use crate::error::Result;

/// Cadence settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Extra wait after a failed cycle, on top of `interval`.
    pub backoff: Duration,
    /// Length of the very first window.
    pub initial_lookback: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::seconds(30),
            backoff: Duration::seconds(30),
            initial_lookback: Duration::minutes(20),
        }
    }
}

/// Driver state between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    /// The last cycle failed; the backoff runs until `until`, then the
    /// usual interval follows.
    Backoff { until: DateTime<Utc> },
}

/// Runs the detection pipeline once per period over contiguous windows.
#[derive(Debug)]
pub struct WindowScheduler {
    pipeline: DetectionPipeline,
    settings: SchedulerSettings,
    window: WindowState,
    state: SchedulerState,
}

impl WindowScheduler {
    pub fn new(pipeline: DetectionPipeline, settings: SchedulerSettings) -> Self {
        Self {
            pipeline,
            settings,
            window: WindowState::new(),
            state: SchedulerState::Running,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Run one cycle with the window ending at `now`.
    ///
    /// # Errors
    /// Returns the pipeline error after rolling the window back and
    /// entering backoff.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        let snapshot = self.window.snapshot();
        let window = self.window.advance(now, self.settings.initial_lookback);

        match self.pipeline.run(window).await {
            Ok(report) => {
                self.state = SchedulerState::Running;
                info!(
                    window_start = %window.start,
                    window_end = %window.end,
                    transfers = report.transfers,
                    trades = report.trades,
                    matchers = report.matchers,
                    matched = report.matched,
                    persisted = report.persisted,
                    "Cycle complete"
                );
                if report.panicked > 0 {
                    warn!(panicked = report.panicked, "Some matcher tasks panicked");
                }
                Ok(report)
            }
            Err(e) => {
                self.window.restore(snapshot);
                let until = self.back_off(now);
                error!(
                    window_start = %window.start,
                    window_end = %window.end,
                    backoff_until = %until,
                    error = %e,
                    "Cycle failed, window rolled back"
                );
                Err(e)
            }
        }
    }

    /// Enter backoff for a failure observed at `failed_at`.
    fn back_off(&mut self, failed_at: DateTime<Utc>) -> DateTime<Utc> {
        let until = failed_at + self.settings.backoff;
        self.state = SchedulerState::Backoff { until };
        until
    }

    /// How long the driver waits after a cycle that returned at `now`.
    ///
    /// The interval after a success. After a failure, whatever remains of
    /// the backoff plus the interval.
    pub fn next_delay(&self, now: DateTime<Utc>) -> StdDuration {
        let delay = match self.state {
            SchedulerState::Running => self.settings.interval,
            SchedulerState::Backoff { until } => {
                self.settings.interval + (until - now).max(Duration::zero())
            }
        };
        delay.to_std().unwrap_or(StdDuration::ZERO)
    }

    /// Drive cycles forever with fixed-delay semantics.
    pub async fn run(&mut self) {
        info!(
            matchers = self.pipeline.matchers().len(),
            trade_sources = self.pipeline.aggregator().len(),
            interval_secs = self.settings.interval.num_seconds(),
            "Scheduler started"
        );

        loop {
            // Failures are logged and rolled back inside the cycle.
            if self.run_cycle_at(Utc::now()).await.is_err() {
                // Backoff counts from when the failure surfaced.
                self.back_off(Utc::now());
            }
            tokio::time::sleep(self.next_delay(Utc::now())).await;
        }
    }
}
