//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

/// Error code the cloud returns when a dry-run request would have succeeded.
pub const DRY_RUN_OPERATION: &str = "DryRunOperation";

/// Error codes for an instance id that is malformed or does not exist.
pub const INVALID_INSTANCE_ID_CODES: &[&str] =
    &["InvalidInstanceID.Malformed", "InvalidInstanceID.NotFound"];

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading or planning a worksheet. Always fatal, and
/// always raised before any cloud interaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("`operations` must be a list in the YAML config.")]
    OperationsNotList,

    #[error("Operation #{index} ({op_type}) has invalid parameters: {source}")]
    InvalidOperation {
        index: usize,
        op_type: String,
        #[source]
        source: serde_yaml::Error,
    },
}

// ── Step errors ───────────────────────────────────────────────────────────────

/// Resolution failures for a single worksheet step. Never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("missing 'type' key")]
    MissingType,

    #[error("unknown operation type '{0}'")]
    UnknownType(String),
}

// ── Cloud errors ──────────────────────────────────────────────────────────────

/// A failure reported by (or while talking to) the cloud collaborator.
#[derive(Debug, Error)]
pub enum CloudError {
    /// The request was a dry run and would have succeeded.
    #[error("Request would have succeeded, but DryRun flag is set.")]
    DryRunOperation,

    /// The cloud API rejected the request with an error code.
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// The collaborator failed without a recognizable error code.
    #[error("cloud call failed: {0}")]
    Unrecognized(String),

    /// The collaborator answered with a payload we could not decode.
    #[error("cannot decode {operation} response")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The collaborator could not be reached at all.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl CloudError {
    /// Build an error from an API error code, folding the dry-run
    /// confirmation code into its own variant.
    #[must_use]
    pub fn from_code(code: &str, message: &str) -> Self {
        if code == DRY_RUN_OPERATION {
            return Self::DryRunOperation;
        }
        Self::Api {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// The API error code, if the cloud reported one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::DryRunOperation => Some(DRY_RUN_OPERATION),
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// `true` when the cloud confirmed that a dry-run request would have succeeded.
    #[must_use]
    pub fn is_dry_run_confirmation(&self) -> bool {
        matches!(self, Self::DryRunOperation)
    }

    /// `true` for malformed or unknown instance ids.
    #[must_use]
    pub fn is_invalid_instance_id(&self) -> bool {
        self.code()
            .is_some_and(|code| INVALID_INSTANCE_ID_CODES.contains(&code))
    }
}

// ── Rehydrate errors ──────────────────────────────────────────────────────────

/// Failures that end a rehydration.
#[derive(Debug, Error)]
pub enum RehydrateError {
    #[error("Source instance {0} not found")]
    SourceNotFound(String),

    #[error("launch of {instance_type} from {image_id} returned no instance")]
    NoInstanceLaunched {
        image_id: String,
        instance_type: String,
    },

    #[error("Instance {instance_id} did not reach OK within {timeout_secs} seconds")]
    HealthTimeout {
        instance_id: String,
        timeout_secs: u64,
    },

    #[error("health wait for instance {0} cancelled")]
    Cancelled(String),
}
