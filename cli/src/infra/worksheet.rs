//! Worksheet loading from disk and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::Value;

use crate::domain::{ConfigError, EnvOverrides, Worksheet, WorksheetDocument};

/// Load a `.env` file from the working directory or one of its parents.
///
/// Variables already present in the process environment are not replaced.
/// Returns the path that was loaded, or `None` when there is no file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read `AWS_PROFILE`, `AWS_REGION` and `SRE_TOOLKIT_DRY_RUN` from the
/// process environment.
///
/// # Errors
///
/// Returns an error if a variable is set but is not valid unicode.
pub fn env_overrides() -> Result<EnvOverrides> {
    envy::from_env::<EnvOverrides>().context("failed to read environment overrides")
}

/// Load a worksheet file and resolve it against `env`.
///
/// An empty or all-null document is an empty worksheet.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if `path` does not exist, `Read` or
/// `Parse` if it cannot be read or is not a YAML mapping, and
/// `OperationsNotList` if `operations` is not a list.
pub fn load_worksheet(path: &Path, env: &EnvOverrides) -> Result<Worksheet, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_document(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let worksheet = Worksheet::from_document(doc, env)?;
    tracing::debug!(
        path = %path.display(),
        operations = worksheet.operations.len(),
        "worksheet loaded"
    );
    Ok(worksheet)
}

fn parse_document(content: &str) -> Result<WorksheetDocument, serde_yaml::Error> {
    match serde_yaml::from_str::<Value>(content)? {
        Value::Null => Ok(WorksheetDocument::default()),
        value => serde_yaml::from_value(value),
    }
}
