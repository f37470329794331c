//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod error;
pub mod instance;
pub mod operation;
pub mod run;
pub mod worksheet;

pub use error::{CloudError, ConfigError, RehydrateError, StepError};
pub use instance::{
    InstanceDescription, InstanceHealth, InstancePlan, LaunchRequest, SnapshotOwner,
    SnapshotRecord, Tag,
};
pub use operation::{Operation, OperationKind, PlannedStep};
pub use run::{ErrorPolicy, RunSummary};
pub use worksheet::{EnvOverrides, OperationSpec, RunSettings, Worksheet, WorksheetDocument};
