//! Worksheet document schema and run-settings resolution.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::domain::error::ConfigError;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_REGION: &str = "us-east-1";

// ── Document schema ──────────────────────────────────────────────────────────

/// Top-level worksheet file as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorksheetDocument {
    /// Named cloud credentials profile.
    pub aws_profile: Option<String>,
    /// Target region.
    pub region: Option<String>,
    /// Simulate every mutating call. Defaults to `true` when omitted.
    pub dry_run: Option<bool>,
    /// Ordered operations; kept untyped until the list shape is checked.
    pub operations: Option<Value>,
}

/// Process-wide overrides read from the environment.
///
/// Field names follow the variable names (`AWS_PROFILE`, `AWS_REGION`,
/// `SRE_TOOLKIT_DRY_RUN`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvOverrides {
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
    pub sre_toolkit_dry_run: Option<String>,
}

/// Settings that apply to every operation of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub profile: String,
    pub region: String,
    pub dry_run: bool,
}

// ── Operation specs ──────────────────────────────────────────────────────────

/// One worksheet entry: a `type` tag plus the operation's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSpec {
    op_type: Option<String>,
    params: Mapping,
}

impl OperationSpec {
    /// Split a raw worksheet entry into its `type` and remaining parameters.
    ///
    /// A non-string or empty `type`, and entries that are not mappings at
    /// all, yield a spec without a type.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Mapping(mut params) = value else {
            return Self {
                op_type: None,
                params: Mapping::new(),
            };
        };
        let op_type = match params.remove("type") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };
        Self { op_type, params }
    }

    /// The operation type, if present.
    #[must_use]
    pub fn op_type(&self) -> Option<&str> {
        self.op_type.as_deref()
    }

    /// Parameters forwarded to the handler (every key except `type`).
    #[must_use]
    pub fn params(&self) -> &Mapping {
        &self.params
    }
}

/// A loaded worksheet: resolved settings and the ordered operation list.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub settings: RunSettings,
    pub operations: Vec<OperationSpec>,
}

impl Worksheet {
    /// Resolve a parsed document against environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OperationsNotList` if `operations` is present
    /// but is not a list.
    pub fn from_document(doc: WorksheetDocument, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let operations = match doc.operations {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.into_iter().map(OperationSpec::from_value).collect(),
            Some(_) => return Err(ConfigError::OperationsNotList),
        };

        let profile = first_non_empty(doc.aws_profile, env.aws_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let region = first_non_empty(doc.region, env.aws_region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let dry_run = match env
            .sre_toolkit_dry_run
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(raw) => parse_truthy(raw),
            None => doc.dry_run.unwrap_or(true),
        };

        Ok(Self {
            settings: RunSettings {
                profile,
                region,
                dry_run,
            },
            operations,
        })
    }
}

/// Interpret an environment flag: `1`, `true` and `yes` (any case) are true.
#[must_use]
pub fn parse_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.filter(|s| !s.is_empty()))
}
