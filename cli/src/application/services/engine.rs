//! Execution engine — runs a worksheet's steps in order, isolating failures.
//!
//! Steps are dispatched strictly one after another: later steps may depend
//! on cloud state produced by earlier ones. A step that cannot be resolved
//! or whose handler fails is reported and, under `ErrorPolicy::Continue`,
//! does not stop the run.

use crate::application::context::RunContext;
use crate::application::ports::{CloudContext, RunReporter};
use crate::application::services::dispatch::dispatch;
use crate::domain::operation::{PlannedStep, plan};
use crate::domain::{ConfigError, Worksheet};

pub use crate::domain::run::{ErrorPolicy, RunSummary};

/// Plan and execute a worksheet.
///
/// # Errors
///
/// Returns a `ConfigError` if any resolvable step has invalid parameters.
/// Nothing is dispatched in that case.
pub async fn run_worksheet(
    worksheet: &Worksheet,
    ctx: &RunContext<'_, impl CloudContext>,
    policy: ErrorPolicy,
    reporter: &impl RunReporter,
) -> Result<RunSummary, ConfigError> {
    let steps = plan(&worksheet.operations)?;
    reporter.run_started(&worksheet.settings, steps.len());
    Ok(execute(&steps, ctx, policy, reporter).await)
}

/// Execute planned steps in order.
pub async fn execute(
    steps: &[PlannedStep],
    ctx: &RunContext<'_, impl CloudContext>,
    policy: ErrorPolicy,
    reporter: &impl RunReporter,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        if ctx.cancel.is_cancelled() {
            summary.cancelled = true;
            reporter.run_cancelled(index);
            break;
        }
        summary.attempted += 1;

        let ok = match step {
            PlannedStep::Rejected(reason) => {
                summary.rejected += 1;
                reporter.step_rejected(index, reason);
                false
            }
            PlannedStep::Ready(operation) => {
                let op_type = operation.kind().name();
                reporter.step_started(index, op_type);
                match dispatch(ctx, operation).await {
                    Ok(()) => {
                        summary.succeeded += 1;
                        reporter.step_succeeded(index, op_type);
                        true
                    }
                    Err(e) => {
                        summary.failed += 1;
                        reporter.step_failed(index, op_type, &e);
                        false
                    }
                }
            }
        };

        if !ok && policy == ErrorPolicy::Stop {
            summary.stopped_early = index < steps.len();
            break;
        }
    }

    reporter.run_complete(&summary);
    summary
}
