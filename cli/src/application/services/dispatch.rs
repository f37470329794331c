//! Dispatch a resolved operation to its handler.

use anyhow::Result;

use crate::application::context::RunContext;
use crate::application::ports::CloudContext;
use crate::application::services::{lifecycle, rehydrate, snapshots};
use crate::domain::Operation;

/// Run one operation against the run context.
///
/// Handler results other than success/failure are logged by the handlers
/// themselves and dropped here.
///
/// # Errors
///
/// Returns whatever error the handler raised.
pub async fn dispatch(ctx: &RunContext<'_, impl CloudContext>, operation: &Operation) -> Result<()> {
    match operation {
        Operation::StartInstance(params) => lifecycle::start_instance(ctx, params).await.map(drop),
        Operation::StopInstance(params) => lifecycle::stop_instance(ctx, params).await.map(drop),
        Operation::SnapshotVolume(params) => snapshots::snapshot_volume(ctx, params).await.map(drop),
        Operation::CleanupSnapshots(params) => {
            snapshots::cleanup_snapshots(ctx, params).await.map(drop)
        }
        Operation::RehydrateInstance(params) => {
            rehydrate::rehydrate_instance(ctx, params).await.map(drop)
        }
    }
}
