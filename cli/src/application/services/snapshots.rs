//! Snapshot operations: snapshot a volume, prune expired snapshots.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::application::context::RunContext;
use crate::application::ports::SnapshotStore;
use crate::domain::CloudError;
use crate::domain::instance::{
    DRY_RUN_SENTINEL, SnapshotOwner, expired_snapshots, retention_cutoff,
};
use crate::domain::operation::{CleanupSnapshotsParams, SnapshotVolumeParams};

/// Create one snapshot and return its id, or the dry-run sentinel.
///
/// A dry-run confirmation from the cloud is the dry-run success.
///
/// # Errors
///
/// Returns any other cloud error unchanged.
pub(crate) async fn request_snapshot(
    store: &impl SnapshotStore,
    volume_id: &str,
    description: &str,
    dry_run: bool,
) -> Result<String, CloudError> {
    let result = store.create_snapshot(volume_id, description, dry_run).await;
    if dry_run {
        return match result {
            Ok(_) | Err(CloudError::DryRunOperation) => Ok(DRY_RUN_SENTINEL.to_string()),
            Err(e) => Err(e),
        };
    }
    match result {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(CloudError::Unrecognized(format!(
            "create-snapshot for {volume_id} returned no snapshot id"
        ))),
        Err(e) => Err(e),
    }
}

/// Snapshot a single volume.
///
/// # Errors
///
/// Returns an error if the cloud rejects the snapshot request.
pub async fn snapshot_volume(
    ctx: &RunContext<'_, impl SnapshotStore>,
    params: &SnapshotVolumeParams,
) -> Result<String> {
    let volume_id = params.volume_id.as_str();
    let description = params.description();
    tracing::info!(
        volume_id,
        dry_run = ctx.dry_run,
        description = %description,
        "creating snapshot"
    );

    match request_snapshot(ctx.cloud, volume_id, &description, ctx.dry_run).await {
        Ok(snapshot_id) => {
            tracing::info!(volume_id, snapshot_id = %snapshot_id, "snapshot requested");
            Ok(snapshot_id)
        }
        Err(e) => {
            tracing::error!(volume_id, error = %e, "failed to snapshot volume");
            Err(anyhow::Error::new(e).context(format!("failed to snapshot volume {volume_id}")))
        }
    }
}

/// Result of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Snapshots listed for the owner.
    pub examined: usize,
    /// Expired snapshots deleted (or, under dry run, confirmed deletable).
    pub deleted: Vec<String>,
    /// Expired snapshots whose delete call failed.
    pub failed: Vec<String>,
}

/// Delete every snapshot older than the retention window, as of now.
///
/// # Errors
///
/// Returns an error only if the snapshot listing fails; individual delete
/// failures are recorded in the report.
pub async fn cleanup_snapshots(
    ctx: &RunContext<'_, impl SnapshotStore>,
    params: &CleanupSnapshotsParams,
) -> Result<CleanupReport> {
    cleanup_snapshots_at(ctx, params, Utc::now()).await
}

/// Delete every snapshot strictly older than `now - retention_days`.
///
/// # Errors
///
/// Returns an error only if the snapshot listing fails.
pub async fn cleanup_snapshots_at(
    ctx: &RunContext<'_, impl SnapshotStore>,
    params: &CleanupSnapshotsParams,
    now: DateTime<Utc>,
) -> Result<CleanupReport> {
    tracing::info!(
        retention_days = params.retention_days,
        dry_run = ctx.dry_run,
        "cleaning up expired snapshots"
    );
    let cutoff = retention_cutoff(now, params.retention_days);
    let owner = SnapshotOwner::from_option(params.owner_id.as_deref());

    let snapshots = ctx
        .cloud
        .describe_snapshots(&owner)
        .await
        .with_context(|| format!("listing snapshots for owner {}", owner.as_filter()))?;

    let mut report = CleanupReport {
        examined: snapshots.len(),
        ..CleanupReport::default()
    };

    for snap in expired_snapshots(&snapshots, cutoff) {
        let snapshot_id = snap.snapshot_id.as_str();
        tracing::info!(
            snapshot_id,
            start_time = %snap.start_time,
            cutoff = %cutoff,
            "snapshot is older than cutoff, deleting"
        );
        match ctx.cloud.delete_snapshot(snapshot_id, ctx.dry_run).await {
            Ok(()) => report.deleted.push(snap.snapshot_id.clone()),
            Err(e) if e.is_dry_run_confirmation() => {
                tracing::info!(snapshot_id, "dry run: delete would have succeeded");
                report.deleted.push(snap.snapshot_id.clone());
            }
            Err(e) => {
                tracing::error!(snapshot_id, error = %e, "failed to delete snapshot");
                report.failed.push(snap.snapshot_id.clone());
            }
        }
    }

    tracing::info!(
        examined = report.examined,
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "snapshot cleanup finished"
    );
    Ok(report)
}
