//! Run context — the state threaded through every operation handler.

use crate::application::cancel::CancelSignal;

/// Cloud handle, dry-run policy, and cancellation signal for one run.
///
/// Dry-run is fixed for the whole run; handlers read it from here and never
/// take it as a per-operation parameter.
pub struct RunContext<'a, C> {
    /// Cloud collaborator every handler issues its calls through.
    pub cloud: &'a C,
    /// When `true`, every mutating cloud call is validated but not committed.
    pub dry_run: bool,
    /// Raised on operator interrupt.
    pub cancel: CancelSignal,
}

impl<'a, C> RunContext<'a, C> {
    #[must_use]
    pub fn new(cloud: &'a C, dry_run: bool, cancel: CancelSignal) -> Self {
        Self {
            cloud,
            dry_run,
            cancel,
        }
    }
}
