//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`
//! or `crate::commands`.

pub mod cancel;
pub mod context;
pub mod ports;
pub mod services;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use context::RunContext;
pub use ports::{
    CloudContext, CommandRunner, InstanceInspector, InstanceLifecycle, RunReporter, SnapshotStore,
};
