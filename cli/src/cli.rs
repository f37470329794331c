//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::commands;

/// Declarative runbook executor for cloud infrastructure maintenance
#[derive(Parser)]
#[command(
    name = "sre-toolkit",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long, global = true, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute every operation in a worksheet
    Run(commands::run::RunArgs),

    /// Load and plan a worksheet without touching the cloud
    Validate(commands::validate::ValidateArgs),
}

/// Log verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the worksheet cannot be loaded or planned.
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Run(args) => commands::run::run(&args).await,
            Command::Validate(args) => commands::validate::run(&args),
        }
    }
}
