//! Instance lifecycle operations: start and stop.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::context::RunContext;
use crate::application::ports::InstanceLifecycle;
use crate::domain::CloudError;
use crate::domain::operation::InstanceParams;

/// How a start or stop request ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The cloud accepted the request.
    Issued,
    /// Dry run: the cloud confirmed the request would have succeeded.
    DryRunConfirmed,
    /// Dry run: the instance id was malformed or unknown. Expected when
    /// rehearsing with placeholder ids.
    DryRunInvalidId,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Start,
    Stop,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Start an instance.
///
/// # Errors
///
/// Returns an error for any cloud failure other than a dry-run
/// confirmation, or an invalid instance id under dry run.
pub async fn start_instance(
    ctx: &RunContext<'_, impl InstanceLifecycle>,
    params: &InstanceParams,
) -> Result<LifecycleOutcome> {
    let id = params.instance_id.as_str();
    tracing::info!(instance_id = id, dry_run = ctx.dry_run, "request to start instance");
    let result = ctx.cloud.start_instance(id, ctx.dry_run).await;
    settle(Action::Start, id, ctx.dry_run, result)
}

/// Stop an instance.
///
/// # Errors
///
/// Returns an error for any cloud failure other than a dry-run
/// confirmation, or an invalid instance id under dry run.
pub async fn stop_instance(
    ctx: &RunContext<'_, impl InstanceLifecycle>,
    params: &InstanceParams,
) -> Result<LifecycleOutcome> {
    let id = params.instance_id.as_str();
    tracing::info!(instance_id = id, dry_run = ctx.dry_run, "request to stop instance");
    let result = ctx.cloud.stop_instance(id, ctx.dry_run).await;
    settle(Action::Stop, id, ctx.dry_run, result)
}

/// Classify a start/stop result.
///
/// # Errors
///
/// Passes through every error that is not an expected dry-run outcome.
pub fn classify(
    result: Result<(), CloudError>,
    dry_run: bool,
) -> Result<LifecycleOutcome, CloudError> {
    match result {
        Ok(()) => Ok(LifecycleOutcome::Issued),
        Err(e) if e.is_dry_run_confirmation() => Ok(LifecycleOutcome::DryRunConfirmed),
        Err(e) if dry_run && e.is_invalid_instance_id() => Ok(LifecycleOutcome::DryRunInvalidId),
        Err(e) => Err(e),
    }
}

fn settle(
    action: Action,
    instance_id: &str,
    dry_run: bool,
    result: Result<(), CloudError>,
) -> Result<LifecycleOutcome> {
    let verb = action.verb();
    match classify(result, dry_run) {
        Ok(LifecycleOutcome::Issued) => {
            tracing::info!(instance_id, "{verb} call issued");
            Ok(LifecycleOutcome::Issued)
        }
        Ok(LifecycleOutcome::DryRunConfirmed) => {
            tracing::info!(instance_id, "dry run: {verb} would have succeeded");
            Ok(LifecycleOutcome::DryRunConfirmed)
        }
        Ok(LifecycleOutcome::DryRunInvalidId) => {
            tracing::warn!(
                instance_id,
                "dry run: instance id is malformed or unknown, treating as expected"
            );
            Ok(LifecycleOutcome::DryRunInvalidId)
        }
        Err(e) => {
            tracing::error!(instance_id, error = %e, "failed to {verb} instance");
            Err(anyhow::Error::new(e).context(format!("failed to {verb} instance {instance_id}")))
        }
    }
}
