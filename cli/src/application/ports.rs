//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`
//! or `crate::commands`.

use std::process::Output;

use anyhow::Result;

use crate::domain::{
    CloudError, InstanceDescription, InstanceHealth, LaunchRequest, RunSettings, RunSummary,
    SnapshotOwner, SnapshotRecord, StepError,
};

// ── Cloud Port Traits ─────────────────────────────────────────────────────────

/// Instance lifecycle mutations. Every call honors `dry_run` natively.
#[allow(async_fn_in_trait)]
pub trait InstanceLifecycle {
    /// Start a stopped instance.
    async fn start_instance(&self, instance_id: &str, dry_run: bool) -> Result<(), CloudError>;
    /// Stop a running instance.
    async fn stop_instance(&self, instance_id: &str, dry_run: bool) -> Result<(), CloudError>;
    /// Launch exactly one instance and return its id, or `None` if the cloud
    /// reported no instance.
    async fn run_instance(
        &self,
        request: &LaunchRequest,
        dry_run: bool,
    ) -> Result<Option<String>, CloudError>;
}

/// Read-only instance queries.
#[allow(async_fn_in_trait)]
pub trait InstanceInspector {
    /// Describe one instance, `None` if the cloud returned nothing for it.
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceDescription>, CloudError>;
    /// Current status checks, `None` while the cloud has none to report.
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceHealth>, CloudError>;
}

/// Block-storage snapshot operations.
#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// Snapshot a volume and return the new snapshot id.
    async fn create_snapshot(
        &self,
        volume_id: &str,
        description: &str,
        dry_run: bool,
    ) -> Result<Option<String>, CloudError>;
    /// Delete a snapshot by id.
    async fn delete_snapshot(&self, snapshot_id: &str, dry_run: bool) -> Result<(), CloudError>;
    /// List snapshots owned by `owner`.
    async fn describe_snapshots(
        &self,
        owner: &SnapshotOwner,
    ) -> Result<Vec<SnapshotRecord>, CloudError>;
}

/// Composite trait: any type implementing all three sub-traits is a `CloudContext`.
pub trait CloudContext: InstanceLifecycle + InstanceInspector + SnapshotStore {}

/// Blanket implementation: any type implementing all three sub-traits is a `CloudContext`.
impl<T> CloudContext for T where T: InstanceLifecycle + InstanceInspector + SnapshotStore {}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Run Reporting Port ────────────────────────────────────────────────────────

/// Receives step-level outcomes from the execution engine. Synchronous.
pub trait RunReporter {
    /// The run is about to execute `steps` steps.
    fn run_started(&self, settings: &RunSettings, steps: usize);
    /// Step `index` (1-based) is being dispatched.
    fn step_started(&self, index: usize, op_type: &str);
    /// Step `index` finished without error.
    fn step_succeeded(&self, index: usize, op_type: &str);
    /// Step `index` could not be resolved and was skipped.
    fn step_rejected(&self, index: usize, reason: &StepError);
    /// Step `index` returned an error; the run continues unless told otherwise.
    fn step_failed(&self, index: usize, op_type: &str, error: &anyhow::Error);
    /// The run was cancelled before step `next_index`.
    fn run_cancelled(&self, next_index: usize);
    /// All steps have been processed.
    fn run_complete(&self, summary: &RunSummary);
}
