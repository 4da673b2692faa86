//! Fixed-interval scheduling of check runs
//!
//! Runs are awaited inline, so two runs never overlap. Ticks missed while a
//! slow run was executing are skipped rather than replayed.

use crate::checker::{Checker, RunReport};
use crate::notifier::{failure_alert_message, recovery_message};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Scheduling knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub interval: Duration,
    pub run_on_startup: bool,
    /// Consecutive failed runs before an alert is sent; 0 disables alerts
    pub failure_alert_threshold: u32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
            run_on_startup: true,
            failure_alert_threshold: 3,
        }
    }
}

/// Counts consecutive failed runs and decides when to alert
#[derive(Debug, Clone, Default)]
pub struct FailureTracker {
    threshold: u32,
    consecutive: u32,
    alerted: bool,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    /// Record a failed run. Returns the failure count when an alert is due;
    /// at most one alert per streak.
    pub fn record_failure(&mut self) -> Option<u32> {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.threshold > 0 && !self.alerted && self.consecutive >= self.threshold {
            self.alerted = true;
            return Some(self.consecutive);
        }
        None
    }

    /// Record a successful run. Returns the length of the ended streak when
    /// an alert had gone out for it.
    pub fn record_success(&mut self) -> Option<u32> {
        let failed = self.consecutive;
        let alerted = self.alerted;
        self.consecutive = 0;
        self.alerted = false;
        alerted.then_some(failed)
    }
}

/// Drives a [`Checker`] on a fixed interval
#[derive(Debug)]
pub struct Scheduler {
    checker: Checker,
    options: ScheduleOptions,
}

impl Scheduler {
    pub fn new(checker: Checker, options: ScheduleOptions) -> Self {
        Self { checker, options }
    }

    /// Run until `shutdown` completes. Shutdown is observed between runs.
    ///
    /// Returns the number of runs started.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.options.run_on_startup {
            // the first tick completes immediately
            ticker.tick().await;
        }

        tracing::info!(
            interval_secs = self.options.interval.as_secs(),
            run_on_startup = self.options.run_on_startup,
            "Scheduler started"
        );

        let mut tracker = FailureTracker::new(self.options.failure_alert_threshold);
        let mut runs = 0;
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(runs, "Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }
            runs += 1;
            self.run_once(&mut tracker).await;
        }
        runs
    }

    /// Run until Ctrl-C
    pub async fn run_forever(&self) -> u64 {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for Ctrl-C; running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// One run with failure bookkeeping. Errors are logged, never propagated.
    pub async fn run_once(&self, tracker: &mut FailureTracker) -> Option<RunReport> {
        match self.checker.run().await {
            Ok(report) => {
                if let Some(failed_runs) = tracker.record_success() {
                    tracing::info!(failed_runs, "Checks recovered");
                    self.send_alert(&recovery_message(failed_runs)).await;
                }
                Some(report)
            }
            Err(err) => {
                tracing::error!(
                    stage = err.stage(),
                    consecutive_failures = tracker.consecutive_failures() + 1,
                    error = %err,
                    "Failed to check versions"
                );
                if let Some(count) = tracker.record_failure() {
                    let message = failure_alert_message(count, err.stage(), &err.to_string());
                    self.send_alert(&message).await;
                }
                None
            }
        }
    }

    async fn send_alert(&self, message: &str) {
        if let Err(err) = self.checker.notifier().notify(message).await {
            tracing::warn!(error = %err, "Failed to send alert notification");
        }
    }
}
