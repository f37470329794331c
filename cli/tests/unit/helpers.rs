//! Shared test helpers: run contexts, reporters, and fixture builders.

#![allow(dead_code, clippy::expect_used)]

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sre_toolkit::application::ports::RunReporter;
use sre_toolkit::application::{CancelSignal, RunContext};
use sre_toolkit::domain::instance::{BlockDevice, Tag};
use sre_toolkit::domain::{
    InstanceDescription, OperationSpec, RunSettings, RunSummary, SnapshotRecord, StepError,
};

// ── Run context ──────────────────────────────────────────────────────────────

/// A context that is never cancelled.
pub fn ctx<C>(cloud: &C, dry_run: bool) -> RunContext<'_, C> {
    RunContext::new(cloud, dry_run, CancelSignal::never())
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Fixed reference instant used by retention tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid date")
}

pub fn snapshot(id: &str, age_days: i64) -> SnapshotRecord {
    SnapshotRecord {
        snapshot_id: id.to_string(),
        start_time: now() - Duration::days(age_days),
    }
}

pub fn tag(key: &str, value: &str) -> Tag {
    Tag {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// A source instance with one block device per entry in `volumes`.
pub fn source_instance(id: &str, volumes: &[&str]) -> InstanceDescription {
    InstanceDescription {
        instance_id: id.to_string(),
        image_id: "ami-0abc".to_string(),
        subnet_id: Some("subnet-1".to_string()),
        security_group_ids: vec!["sg-1".to_string(), "sg-2".to_string()],
        iam_instance_profile_arn: Some("arn:aws:iam::123:instance-profile/app".to_string()),
        root_device_name: Some("/dev/xvda".to_string()),
        block_devices: volumes
            .iter()
            .enumerate()
            .map(|(i, vol)| BlockDevice {
                device_name: format!("/dev/sd{i}"),
                volume_id: Some((*vol).to_string()),
            })
            .collect(),
        tags: vec![
            tag("Name", "api"),
            tag("aws:cloudformation:stack-name", "core"),
        ],
    }
}

/// Build worksheet entries from YAML.
pub fn specs(yaml: &str) -> Vec<OperationSpec> {
    let items: Vec<serde_yaml::Value> = serde_yaml::from_str(yaml).expect("valid yaml");
    items.into_iter().map(OperationSpec::from_value).collect()
}

// ── Mock: recording reporter ─────────────────────────────────────────────────

/// Records every engine callback as a short string.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("lock").push(event);
    }
}

impl RunReporter for RecordingReporter {
    fn run_started(&self, _: &RunSettings, steps: usize) {
        self.push(format!("run:{steps}"));
    }
    fn step_started(&self, index: usize, op_type: &str) {
        self.push(format!("start:{index}:{op_type}"));
    }
    fn step_succeeded(&self, index: usize, op_type: &str) {
        self.push(format!("ok:{index}:{op_type}"));
    }
    fn step_rejected(&self, index: usize, reason: &StepError) {
        self.push(format!("rejected:{index}:{reason}"));
    }
    fn step_failed(&self, index: usize, op_type: &str, _: &anyhow::Error) {
        self.push(format!("failed:{index}:{op_type}"));
    }
    fn run_cancelled(&self, next_index: usize) {
        self.push(format!("cancelled:{next_index}"));
    }
    fn run_complete(&self, summary: &RunSummary) {
        self.push(format!(
            "done:{}/{}/{}/{}",
            summary.attempted, summary.succeeded, summary.failed, summary.rejected
        ));
    }
}
