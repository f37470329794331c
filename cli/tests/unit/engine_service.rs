//! Tests for the execution engine: ordering, failure isolation, error
//! policy, and cancellation.

#![allow(clippy::expect_used)]

use sre_toolkit::application::cancel_pair;
use sre_toolkit::application::ports::RunReporter;
use sre_toolkit::application::services::engine::{ErrorPolicy, execute, run_worksheet};
use sre_toolkit::application::{CancelHandle, RunContext};
use sre_toolkit::domain::operation::plan;
use sre_toolkit::domain::{ConfigError, RunSettings, RunSummary, StepError, Worksheet};

use crate::helpers::{RecordingReporter, ctx, specs};
use crate::mocks::{CloudCall, FakeCloud};

async fn run_yaml(
    yaml: &str,
    cloud: &FakeCloud,
    dry_run: bool,
    policy: ErrorPolicy,
    reporter: &impl RunReporter,
) -> Result<RunSummary, ConfigError> {
    run_worksheet(&worksheet(yaml, dry_run), &ctx(cloud, dry_run), policy, reporter).await
}

fn worksheet(yaml: &str, dry_run: bool) -> Worksheet {
    Worksheet {
        settings: RunSettings {
            profile: "default".into(),
            region: "us-east-1".into(),
            dry_run,
        },
        operations: specs(yaml),
    }
}

const MIXED: &str = r"
- type: stop_instance
  instance_id: i-1
- instance_id: i-2
- type: reboot_instance
  instance_id: i-3
- type: start_instance
  instance_id: i-1
";

#[tokio::test]
async fn every_step_is_attempted_in_order() {
    let cloud = FakeCloud::new();
    let reporter = RecordingReporter::default();
    let summary = run_yaml(MIXED, &cloud, true, ErrorPolicy::Continue, &reporter)
        .await
        .expect("valid worksheet");

    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        reporter.events(),
        [
            "run:4",
            "start:1:stop_instance",
            "ok:1:stop_instance",
            "rejected:2:missing 'type' key",
            "rejected:3:unknown operation type 'reboot_instance'",
            "start:4:start_instance",
            "ok:4:start_instance",
            "done:4/2/0/2",
        ]
    );
}

#[tokio::test]
async fn rejected_steps_never_reach_the_cloud() {
    let cloud = FakeCloud::new();
    run_yaml(MIXED, &cloud, false, ErrorPolicy::Continue, &RecordingReporter::default())
        .await
        .expect("valid worksheet");
    assert_eq!(
        cloud.calls(),
        vec![
            CloudCall::Stop {
                instance_id: "i-1".into(),
                dry_run: false
            },
            CloudCall::Start {
                instance_id: "i-1".into(),
                dry_run: false
            },
        ]
    );
}

#[tokio::test]
async fn handler_failure_does_not_stop_later_steps() {
    let yaml = r"
- type: stop_instance
  instance_id: i-1
- type: snapshot_volume
  volume_id: vol-1
";
    let cloud = FakeCloud::new().with_lifecycle_error("UnauthorizedOperation");
    let reporter = RecordingReporter::default();
    let summary = run_yaml(yaml, &cloud, false, ErrorPolicy::Continue, &reporter)
        .await
        .expect("valid worksheet");
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(summary.has_failures());
    assert!(reporter.events().contains(&"failed:1:stop_instance".to_string()));
    assert_eq!(cloud.calls().len(), 2);
}

#[tokio::test]
async fn stop_policy_ends_run_at_first_failure() {
    let cloud = FakeCloud::new();
    let summary = run_yaml(MIXED, &cloud, true, ErrorPolicy::Stop, &RecordingReporter::default())
        .await
        .expect("valid worksheet");
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.rejected, 1);
    assert!(summary.stopped_early);
    assert_eq!(cloud.calls().len(), 1);
}

#[tokio::test]
async fn stop_policy_on_last_step_is_not_early() {
    let yaml = r"
- type: start_instance
  instance_id: i-1
- type: nope
";
    let cloud = FakeCloud::new();
    let summary = run_yaml(yaml, &cloud, true, ErrorPolicy::Stop, &RecordingReporter::default())
        .await
        .expect("valid worksheet");
    assert_eq!(summary.attempted, 2);
    assert!(!summary.stopped_early);
}

#[tokio::test]
async fn invalid_parameters_abort_before_any_cloud_call() {
    let yaml = r"
- type: start_instance
  instance_id: i-1
- type: cleanup_snapshots
  retention_days: soon
";
    let cloud = FakeCloud::new();
    let reporter = RecordingReporter::default();
    let err = run_yaml(yaml, &cloud, true, ErrorPolicy::Continue, &reporter)
        .await
        .expect_err("bad params");
    assert!(matches!(
        err,
        ConfigError::InvalidOperation { index: 2, ref op_type, .. } if op_type == "cleanup_snapshots"
    ));
    assert!(cloud.calls().is_empty());
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn empty_worksheet_completes_with_nothing_attempted() {
    let cloud = FakeCloud::new();
    let summary = run_yaml("[]", &cloud, true, ErrorPolicy::Continue, &RecordingReporter::default())
        .await
        .expect("valid worksheet");
    assert_eq!(summary, RunSummary::default());
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_before_start_attempts_nothing() {
    let cloud = FakeCloud::new();
    let (handle, signal) = cancel_pair();
    handle.cancel();
    let steps = plan(&specs(MIXED)).expect("plan");
    let reporter = RecordingReporter::default();
    let summary = execute(&steps, &RunContext::new(&cloud, true, signal), ErrorPolicy::Continue, &reporter).await;
    assert!(summary.cancelled);
    assert_eq!(summary.attempted, 0);
    assert_eq!(reporter.events(), ["cancelled:1", "done:0/0/0/0"]);
    assert!(cloud.calls().is_empty());
}

/// Raises the cancel signal once the first step succeeds.
struct CancelAfterFirst {
    handle: CancelHandle,
    inner: RecordingReporter,
}

impl RunReporter for CancelAfterFirst {
    fn run_started(&self, settings: &RunSettings, steps: usize) {
        self.inner.run_started(settings, steps);
    }
    fn step_started(&self, index: usize, op_type: &str) {
        self.inner.step_started(index, op_type);
    }
    fn step_succeeded(&self, index: usize, op_type: &str) {
        self.inner.step_succeeded(index, op_type);
        self.handle.cancel();
    }
    fn step_rejected(&self, index: usize, reason: &StepError) {
        self.inner.step_rejected(index, reason);
    }
    fn step_failed(&self, index: usize, op_type: &str, error: &anyhow::Error) {
        self.inner.step_failed(index, op_type, error);
    }
    fn run_cancelled(&self, next_index: usize) {
        self.inner.run_cancelled(next_index);
    }
    fn run_complete(&self, summary: &RunSummary) {
        self.inner.run_complete(summary);
    }
}

#[tokio::test]
async fn cancel_between_steps_skips_the_rest() {
    let cloud = FakeCloud::new();
    let (handle, signal) = cancel_pair();
    let reporter = CancelAfterFirst {
        handle,
        inner: RecordingReporter::default(),
    };
    let summary = run_worksheet(
        &worksheet(MIXED, true),
        &RunContext::new(&cloud, true, signal),
        ErrorPolicy::Continue,
        &reporter,
    )
    .await
    .expect("valid worksheet");
    assert!(summary.cancelled);
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(cloud.calls().len(), 1);
    assert!(reporter.inner.events().contains(&"cancelled:2".to_string()));
}
