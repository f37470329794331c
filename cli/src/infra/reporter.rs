//! `TracingReporter` — infrastructure implementation of `RunReporter`.
//!
//! Emits one structured `tracing` event per engine outcome so that a run's
//! log is a complete record of what was attempted.

use crate::application::ports::RunReporter;
use crate::domain::{RunSettings, RunSummary, StepError};

/// Message logged once every step has been processed.
pub const RUN_COMPLETE: &str = "SRE Toolkit run complete";

/// Reporter that writes engine outcomes to the active `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn run_started(&self, settings: &RunSettings, steps: usize) {
        tracing::info!(
            profile = %settings.profile,
            region = %settings.region,
            dry_run = settings.dry_run,
            steps,
            "starting SRE Toolkit run"
        );
    }

    fn step_started(&self, index: usize, op_type: &str) {
        tracing::info!(step = index, op = op_type, "executing operation");
    }

    fn step_succeeded(&self, index: usize, op_type: &str) {
        tracing::info!(step = index, op = op_type, "operation succeeded");
    }

    fn step_rejected(&self, index: usize, reason: &StepError) {
        tracing::error!(step = index, %reason, "skipping operation");
    }

    fn step_failed(&self, index: usize, op_type: &str, error: &anyhow::Error) {
        tracing::error!(step = index, op = op_type, error = format!("{error:#}"), "operation failed");
    }

    fn run_cancelled(&self, next_index: usize) {
        tracing::warn!(next_step = next_index, "run cancelled, remaining operations skipped");
    }

    fn run_complete(&self, summary: &RunSummary) {
        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            rejected = summary.rejected,
            stopped_early = summary.stopped_early,
            cancelled = summary.cancelled,
            "{RUN_COMPLETE}"
        );
    }
}
