//! Operation registry and typed operation parameters.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::domain::error::{ConfigError, StepError};
use crate::domain::worksheet::OperationSpec;

/// Default health-wait budget for a rehydration, in seconds.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;

// ── Registry ─────────────────────────────────────────────────────────────────

/// Every operation the toolkit knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    StartInstance,
    StopInstance,
    SnapshotVolume,
    CleanupSnapshots,
    RehydrateInstance,
}

impl OperationKind {
    pub const ALL: [Self; 5] = [
        Self::StartInstance,
        Self::StopInstance,
        Self::SnapshotVolume,
        Self::CleanupSnapshots,
        Self::RehydrateInstance,
    ];

    /// The worksheet `type` string for this operation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::StartInstance => "start_instance",
            Self::StopInstance => "stop_instance",
            Self::SnapshotVolume => "snapshot_volume",
            Self::CleanupSnapshots => "cleanup_snapshots",
            Self::RehydrateInstance => "rehydrate_instance",
        }
    }

    /// Look up an operation by its exact, case-sensitive worksheet name.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Parameters ───────────────────────────────────────────────────────────────

/// Parameters for `start_instance` and `stop_instance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceParams {
    pub instance_id: String,
}

/// Parameters for `snapshot_volume`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotVolumeParams {
    pub volume_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SnapshotVolumeParams {
    /// The supplied description, or the toolkit default for this volume.
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("SRE Toolkit snapshot for {}", self.volume_id))
    }
}

/// Parameters for `cleanup_snapshots`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupSnapshotsParams {
    pub retention_days: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Parameters for `rehydrate_instance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RehydrateParams {
    pub source_instance: String,
    pub new_type: String,
    #[serde(default = "default_true")]
    pub preserve_tags: bool,
    #[serde(default = "default_true")]
    pub validate_health: bool,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,
}

fn default_true() -> bool {
    true
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

// ── Typed operations ─────────────────────────────────────────────────────────

/// A resolved operation with its parameters validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    StartInstance(InstanceParams),
    StopInstance(InstanceParams),
    SnapshotVolume(SnapshotVolumeParams),
    CleanupSnapshots(CleanupSnapshotsParams),
    RehydrateInstance(RehydrateParams),
}

impl Operation {
    /// Deserialize a parameter mapping into the parameter struct for `kind`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error for missing required fields, type
    /// mismatches, or unknown fields.
    pub fn parse(kind: OperationKind, params: &Mapping) -> Result<Self, serde_yaml::Error> {
        let value = Value::Mapping(params.clone());
        Ok(match kind {
            OperationKind::StartInstance => Self::StartInstance(serde_yaml::from_value(value)?),
            OperationKind::StopInstance => Self::StopInstance(serde_yaml::from_value(value)?),
            OperationKind::SnapshotVolume => Self::SnapshotVolume(serde_yaml::from_value(value)?),
            OperationKind::CleanupSnapshots => {
                Self::CleanupSnapshots(serde_yaml::from_value(value)?)
            }
            OperationKind::RehydrateInstance => {
                Self::RehydrateInstance(serde_yaml::from_value(value)?)
            }
        })
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::StartInstance(_) => OperationKind::StartInstance,
            Self::StopInstance(_) => OperationKind::StopInstance,
            Self::SnapshotVolume(_) => OperationKind::SnapshotVolume,
            Self::CleanupSnapshots(_) => OperationKind::CleanupSnapshots,
            Self::RehydrateInstance(_) => OperationKind::RehydrateInstance,
        }
    }
}

// ── Planning ─────────────────────────────────────────────────────────────────

/// One worksheet step after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedStep {
    /// Resolved and validated; will be dispatched.
    Ready(Operation),
    /// Could not be resolved; will be reported and skipped.
    Rejected(StepError),
}

/// Resolve and validate every spec of a worksheet.
///
/// Missing or unknown `type`s become `PlannedStep::Rejected` so the run can
/// continue past them. Bad parameters on a resolvable step are a
/// configuration error for the whole worksheet.
///
/// # Errors
///
/// Returns `ConfigError::InvalidOperation` for the first step whose
/// parameters do not match its operation kind.
pub fn plan(specs: &[OperationSpec]) -> Result<Vec<PlannedStep>, ConfigError> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let Some(op_type) = spec.op_type() else {
                return Ok(PlannedStep::Rejected(StepError::MissingType));
            };
            let Some(kind) = OperationKind::resolve(op_type) else {
                return Ok(PlannedStep::Rejected(StepError::UnknownType(
                    op_type.to_string(),
                )));
            };
            Operation::parse(kind, spec.params())
                .map(PlannedStep::Ready)
                .map_err(|source| ConfigError::InvalidOperation {
                    index: i + 1,
                    op_type: op_type.to_string(),
                    source,
                })
        })
        .collect()
}
