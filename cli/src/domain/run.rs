//! Run policy and outcome accounting.
//!
//! Pure types only: no I/O, no async.

/// What the engine does after a step is rejected or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Report the step and move on to the next one.
    #[default]
    Continue,
    /// Report the step and end the run.
    Stop,
}

/// Step accounting for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps the engine looked at.
    pub attempted: usize,
    /// Steps whose handler returned normally.
    pub succeeded: usize,
    /// Steps whose handler returned an error.
    pub failed: usize,
    /// Steps skipped for a missing or unknown `type`.
    pub rejected: usize,
    /// The run ended at a step error under `ErrorPolicy::Stop`.
    pub stopped_early: bool,
    /// The run ended because it was cancelled.
    pub cancelled: bool,
}

impl RunSummary {
    /// `true` if any step was rejected or failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.rejected > 0
    }
}
