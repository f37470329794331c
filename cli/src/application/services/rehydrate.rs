//! Rehydration: replace an instance with a copy on a new instance type.
//!
//! The sequence is describe → snapshot → (dry-run stop) → launch →
//! health wait. The source instance is only ever read. Nothing is rolled
//! back: snapshots taken before a later failure stay behind for
//! `cleanup_snapshots` to prune.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::cancel::CancelSignal;
use crate::application::context::RunContext;
use crate::application::ports::{CloudContext, InstanceInspector};
use crate::application::services::snapshots::request_snapshot;
use crate::domain::RehydrateError;
use crate::domain::instance::{InstanceDescription, InstancePlan, rehydrate_snapshot_description};
use crate::domain::operation::RehydrateParams;

/// Interval between instance status polls while waiting for health checks.
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Terminal state of a successful rehydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RehydrateOutcome {
    /// Dry run: the source was described and every volume snapshot was
    /// validated. Nothing was launched.
    DryRunValidated { snapshot_ids: Vec<String> },
    /// A replacement instance was launched (and, if requested, is healthy).
    Complete {
        new_instance_id: String,
        snapshot_ids: Vec<String>,
    },
}

/// Rehydrate `params.source_instance` onto `params.new_type`.
///
/// # Errors
///
/// Returns `RehydrateError::SourceNotFound` before any other call if the
/// source does not exist, the first cloud error from the snapshot or launch
/// phases, or `RehydrateError::HealthTimeout` if the new instance does not
/// pass its status checks within `params.wait_timeout` seconds.
pub async fn rehydrate_instance(
    ctx: &RunContext<'_, impl CloudContext>,
    params: &RehydrateParams,
) -> Result<RehydrateOutcome> {
    let source_id = params.source_instance.as_str();
    tracing::info!(
        source_instance = source_id,
        new_type = %params.new_type,
        dry_run = ctx.dry_run,
        "starting rehydration"
    );

    // Describe
    let source = describe_source(ctx.cloud, source_id).await?;

    // Extract plan
    let plan = InstancePlan::extract(&source, params.preserve_tags);
    tracing::info!(
        subnet = ?plan.subnet_id,
        security_groups = ?plan.security_group_ids,
        root_device = ?plan.root_device_name,
        volumes = ?plan.volume_ids,
        "source instance details"
    );

    // Snapshot volumes
    let mut snapshot_ids = Vec::with_capacity(plan.volume_ids.len());
    for volume_id in &plan.volume_ids {
        let description = rehydrate_snapshot_description(source_id, volume_id);
        tracing::info!(volume_id = %volume_id, dry_run = ctx.dry_run, "snapshotting volume");
        let snapshot_id = request_snapshot(ctx.cloud, volume_id, &description, ctx.dry_run)
            .await
            .with_context(|| format!("snapshotting volume {volume_id} of {source_id}"))?;
        tracing::info!(volume_id = %volume_id, snapshot_id = %snapshot_id, "snapshot created");
        snapshot_ids.push(snapshot_id);
    }

    if ctx.dry_run {
        tracing::info!(source_instance = source_id, "dry run: stopping after snapshot requests");
        return Ok(RehydrateOutcome::DryRunValidated { snapshot_ids });
    }

    // Launch
    let request = plan.launch_request(&params.new_type);
    tracing::info!(
        image_id = %request.image_id,
        instance_type = %request.instance_type,
        subnet = ?request.subnet_id,
        "launching replacement instance"
    );
    let new_instance_id = ctx
        .cloud
        .run_instance(&request, ctx.dry_run)
        .await
        .with_context(|| format!("launching replacement for {source_id}"))?
        .ok_or_else(|| RehydrateError::NoInstanceLaunched {
            image_id: request.image_id.clone(),
            instance_type: request.instance_type.clone(),
        })?;
    tracing::info!(new_instance_id = %new_instance_id, "launched new instance");

    // Health wait
    if params.validate_health {
        wait_for_healthy(
            ctx.cloud,
            &new_instance_id,
            Duration::from_secs(params.wait_timeout),
            &ctx.cancel,
        )
        .await?;
    }

    tracing::info!(
        new_instance_id = %new_instance_id,
        source_instance = source_id,
        "rehydration complete"
    );
    Ok(RehydrateOutcome::Complete {
        new_instance_id,
        snapshot_ids,
    })
}

async fn describe_source(
    cloud: &impl InstanceInspector,
    source_id: &str,
) -> Result<InstanceDescription> {
    match cloud.describe_instance(source_id).await {
        Ok(Some(source)) => Ok(source),
        Ok(None) => Err(RehydrateError::SourceNotFound(source_id.to_string()).into()),
        Err(e) if e.is_invalid_instance_id() => {
            Err(RehydrateError::SourceNotFound(source_id.to_string()).into())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("describing {source_id}"))),
    }
}

/// Poll instance status every `HEALTH_POLL_INTERVAL` until both status
/// checks report `ok`.
///
/// # Errors
///
/// Returns `RehydrateError::HealthTimeout` once more than `timeout` has
/// elapsed since the wait began, `RehydrateError::Cancelled` if the run is
/// cancelled, or the status query's cloud error.
pub async fn wait_for_healthy(
    cloud: &impl InstanceInspector,
    instance_id: &str,
    timeout: Duration,
    cancel: &CancelSignal,
) -> Result<()> {
    tracing::info!(
        instance_id,
        timeout_secs = timeout.as_secs(),
        "waiting for instance to reach 'ok' status"
    );
    let started = tokio::time::Instant::now();
    loop {
        if started.elapsed() > timeout {
            return Err(RehydrateError::HealthTimeout {
                instance_id: instance_id.to_string(),
                timeout_secs: timeout.as_secs(),
            }
            .into());
        }

        let health = cloud
            .describe_instance_status(instance_id)
            .await
            .with_context(|| format!("querying status of {instance_id}"))?;
        if let Some(health) = health {
            tracing::info!(
                instance_id,
                system = %health.system,
                instance = %health.instance,
                "instance status"
            );
            if health.is_healthy() {
                tracing::info!(instance_id, "instance is healthy");
                return Ok(());
            }
        }

        tokio::select! {
            () = tokio::time::sleep(HEALTH_POLL_INTERVAL) => {}
            () = cancel.cancelled() => {
                return Err(RehydrateError::Cancelled(instance_id.to_string()).into());
            }
        }
    }
}
