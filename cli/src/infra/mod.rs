//! Infrastructure layer — adapters that implement application ports.
//!
//! Everything that touches the process environment, the filesystem, child
//! processes or the global logger lives here.

pub mod aws_cli;
pub mod command_runner;
pub mod logging;
pub mod reporter;
pub mod worksheet;
