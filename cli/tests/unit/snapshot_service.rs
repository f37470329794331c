//! Tests for the snapshot and retention-cleanup handlers.

#![allow(clippy::expect_used)]

use sre_toolkit::application::services::snapshots::{cleanup_snapshots_at, snapshot_volume};
use sre_toolkit::domain::SnapshotOwner;
use sre_toolkit::domain::instance::DRY_RUN_SENTINEL;
use sre_toolkit::domain::operation::{CleanupSnapshotsParams, SnapshotVolumeParams};

use crate::helpers::{ctx, now, snapshot};
use crate::mocks::{CloudCall, FakeCloud};

fn volume(id: &str, description: Option<&str>) -> SnapshotVolumeParams {
    SnapshotVolumeParams {
        volume_id: id.to_string(),
        description: description.map(str::to_string),
    }
}

fn retention(days: u32) -> CleanupSnapshotsParams {
    CleanupSnapshotsParams {
        retention_days: days,
        owner_id: None,
    }
}

fn deleted_ids(cloud: &FakeCloud) -> Vec<String> {
    cloud
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            CloudCall::DeleteSnapshot { snapshot_id, .. } => Some(snapshot_id),
            _ => None,
        })
        .collect()
}

// ── snapshot_volume ───────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_live_returns_new_id_and_default_description() {
    let cloud = FakeCloud::new();
    let id = snapshot_volume(&ctx(&cloud, false), &volume("vol-1", None))
        .await
        .expect("snapshot");
    assert_eq!(id, "snap-vol-1");
    assert_eq!(
        cloud.calls(),
        vec![CloudCall::CreateSnapshot {
            volume_id: "vol-1".into(),
            description: "SRE Toolkit snapshot for vol-1".into(),
            dry_run: false,
        }]
    );
}

#[tokio::test]
async fn snapshot_dry_run_returns_sentinel() {
    let cloud = FakeCloud::new();
    let id = snapshot_volume(&ctx(&cloud, true), &volume("vol-1", Some("pre-patch")))
        .await
        .expect("dry run confirmation is success");
    assert_eq!(id, DRY_RUN_SENTINEL);
    assert!(matches!(
        &cloud.calls()[0],
        CloudCall::CreateSnapshot { description, dry_run: true, .. } if description == "pre-patch"
    ));
}

#[tokio::test]
async fn snapshot_cloud_error_propagates() {
    let cloud = FakeCloud::new().with_failing_volume("vol-bad");
    let err = snapshot_volume(&ctx(&cloud, false), &volume("vol-bad", None))
        .await
        .expect_err("fails");
    assert!(format!("{err:#}").contains("failed to snapshot volume vol-bad"));
}

// ── cleanup_snapshots ─────────────────────────────────────────────────────────

#[tokio::test]
async fn cleanup_deletes_only_snapshots_older_than_retention() {
    let cloud = FakeCloud::new().with_snapshots(vec![
        snapshot("snap-5d", 5),
        snapshot("snap-10d", 10),
        snapshot("snap-15d", 15),
    ]);
    let report = cleanup_snapshots_at(&ctx(&cloud, false), &retention(7), now())
        .await
        .expect("cleanup");
    assert_eq!(report.examined, 3);
    assert_eq!(report.deleted, ["snap-10d", "snap-15d"]);
    assert!(report.failed.is_empty());
    assert_eq!(deleted_ids(&cloud), ["snap-10d", "snap-15d"]);
}

#[tokio::test]
async fn cleanup_with_oversized_retention_deletes_nothing() {
    let cloud = FakeCloud::new().with_snapshots(vec![snapshot("snap-15d", 15)]);
    for days in [200_000_000, u32::MAX] {
        let report = cleanup_snapshots_at(&ctx(&cloud, false), &retention(days), now())
            .await
            .expect("cleanup");
        assert_eq!(report.examined, 1);
        assert!(report.deleted.is_empty());
    }
    assert!(deleted_ids(&cloud).is_empty());
}

#[tokio::test]
async fn cleanup_keeps_snapshot_exactly_at_cutoff() {
    let cloud = FakeCloud::new().with_snapshots(vec![snapshot("snap-7d", 7)]);
    let report = cleanup_snapshots_at(&ctx(&cloud, false), &retention(7), now())
        .await
        .expect("cleanup");
    assert!(report.deleted.is_empty());
    assert!(deleted_ids(&cloud).is_empty());
}

#[tokio::test]
async fn cleanup_lists_own_snapshots_by_default() {
    let cloud = FakeCloud::new();
    cleanup_snapshots_at(&ctx(&cloud, false), &retention(30), now())
        .await
        .expect("cleanup");
    assert_eq!(
        cloud.calls(),
        vec![CloudCall::DescribeSnapshots(SnapshotOwner::SelfAccount)]
    );
}

#[tokio::test]
async fn cleanup_uses_explicit_owner() {
    let cloud = FakeCloud::new();
    let params = CleanupSnapshotsParams {
        retention_days: 30,
        owner_id: Some("123456789012".into()),
    };
    cleanup_snapshots_at(&ctx(&cloud, false), &params, now())
        .await
        .expect("cleanup");
    assert_eq!(
        cloud.calls(),
        vec![CloudCall::DescribeSnapshots(SnapshotOwner::Account(
            "123456789012".into()
        ))]
    );
}

#[tokio::test]
async fn cleanup_delete_failure_does_not_stop_remaining_deletes() {
    let cloud = FakeCloud::new()
        .with_snapshots(vec![
            snapshot("snap-a", 20),
            snapshot("snap-b", 21),
            snapshot("snap-c", 22),
        ])
        .with_failing_delete("snap-b");
    let report = cleanup_snapshots_at(&ctx(&cloud, false), &retention(7), now())
        .await
        .expect("per-snapshot failures are not fatal");
    assert_eq!(deleted_ids(&cloud), ["snap-a", "snap-b", "snap-c"]);
    assert_eq!(report.deleted, ["snap-a", "snap-c"]);
    assert_eq!(report.failed, ["snap-b"]);
}

#[tokio::test]
async fn cleanup_dry_run_counts_confirmations_as_deleted() {
    let cloud = FakeCloud::new().with_snapshots(vec![snapshot("snap-old", 90)]);
    let report = cleanup_snapshots_at(&ctx(&cloud, true), &retention(7), now())
        .await
        .expect("cleanup");
    assert_eq!(report.deleted, ["snap-old"]);
    assert!(matches!(
        cloud.calls().last(),
        Some(CloudCall::DeleteSnapshot { dry_run: true, .. })
    ));
}

#[tokio::test]
async fn cleanup_listing_error_fails_the_step() {
    let cloud = FakeCloud::new().with_list_error("UnauthorizedOperation");
    let err = cleanup_snapshots_at(&ctx(&cloud, false), &retention(7), now())
        .await
        .expect_err("listing failure is fatal to the step");
    assert!(format!("{err:#}").contains("listing snapshots for owner self"));
}
