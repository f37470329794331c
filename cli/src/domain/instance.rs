//! Cloud resource views used by the lifecycle handlers.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder reported instead of a snapshot id when nothing was created.
pub const DRY_RUN_SENTINEL: &str = "DRY-RUN";

/// Tag keys with this prefix are owned by the cloud and cannot be set.
pub const RESERVED_TAG_PREFIX: &str = "aws:";

/// Status string reported for a passing health check.
pub const HEALTH_OK: &str = "ok";

// ── Instances ────────────────────────────────────────────────────────────────

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A device attached to an instance. `volume_id` is `None` for non-EBS
/// (instance store) devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub device_name: String,
    pub volume_id: Option<String>,
}

/// What the cloud reports about a single instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescription {
    pub instance_id: String,
    pub image_id: String,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub iam_instance_profile_arn: Option<String>,
    pub root_device_name: Option<String>,
    pub block_devices: Vec<BlockDevice>,
    pub tags: Vec<Tag>,
}

/// Everything a rehydration needs to know about its source instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePlan {
    pub image_id: String,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub iam_instance_profile_arn: Option<String>,
    pub root_device_name: Option<String>,
    pub volume_ids: Vec<String>,
    pub tags: Vec<Tag>,
}

impl InstancePlan {
    /// Read the plan out of a source description. Tags are carried only when
    /// `preserve_tags` is set, and never the reserved `aws:` ones.
    #[must_use]
    pub fn extract(source: &InstanceDescription, preserve_tags: bool) -> Self {
        let tags = if preserve_tags {
            source
                .tags
                .iter()
                .filter(|t| !t.key.starts_with(RESERVED_TAG_PREFIX))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Self {
            image_id: source.image_id.clone(),
            subnet_id: source.subnet_id.clone(),
            security_group_ids: source.security_group_ids.clone(),
            iam_instance_profile_arn: source.iam_instance_profile_arn.clone(),
            root_device_name: source.root_device_name.clone(),
            volume_ids: source
                .block_devices
                .iter()
                .filter_map(|bd| bd.volume_id.clone())
                .collect(),
            tags,
        }
    }

    /// Launch request for a single replacement instance of `instance_type`.
    #[must_use]
    pub fn launch_request(&self, instance_type: &str) -> LaunchRequest {
        LaunchRequest {
            image_id: self.image_id.clone(),
            instance_type: instance_type.to_string(),
            subnet_id: self.subnet_id.clone(),
            security_group_ids: self.security_group_ids.clone(),
            tags: self.tags.clone(),
            iam_instance_profile_arn: self.iam_instance_profile_arn.clone(),
        }
    }
}

/// Parameters for launching exactly one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub image_id: String,
    pub instance_type: String,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub tags: Vec<Tag>,
    pub iam_instance_profile_arn: Option<String>,
}

/// Description given to each snapshot taken during a rehydration.
#[must_use]
pub fn rehydrate_snapshot_description(source_instance: &str, volume_id: &str) -> String {
    format!("SRE Toolkit rehydrate snapshot for {source_instance} vol {volume_id}")
}

/// System- and instance-level status checks of a running instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHealth {
    pub system: String,
    pub instance: String,
}

impl InstanceHealth {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.system == HEALTH_OK && self.instance == HEALTH_OK
    }
}

// ── Snapshots ────────────────────────────────────────────────────────────────

/// Whose snapshots to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOwner {
    /// The caller's own account.
    SelfAccount,
    /// A specific account id.
    Account(String),
}

impl SnapshotOwner {
    #[must_use]
    pub fn from_option(owner_id: Option<&str>) -> Self {
        match owner_id {
            Some(id) if !id.is_empty() => Self::Account(id.to_string()),
            _ => Self::SelfAccount,
        }
    }

    /// Value for the owner filter of a snapshot listing.
    #[must_use]
    pub fn as_filter(&self) -> &str {
        match self {
            Self::SelfAccount => "self",
            Self::Account(id) => id,
        }
    }
}

/// A snapshot as listed by the cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub snapshot_id: String,
    pub start_time: DateTime<Utc>,
}

/// Cutoff before which snapshots are expired.
///
/// Saturates at the earliest representable instant, so an oversized
/// retention expires nothing.
#[must_use]
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(retention_days))
        .and_then(|retention| now.checked_sub_signed(retention))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Snapshots strictly older than `cutoff`, in listing order.
#[must_use]
pub fn expired_snapshots(records: &[SnapshotRecord], cutoff: DateTime<Utc>) -> Vec<&SnapshotRecord> {
    records.iter().filter(|s| s.start_time < cutoff).collect()
}
