//! Validate command — load and plan a worksheet, print the steps.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::domain::operation::{Operation, PlannedStep, plan};
use crate::infra::worksheet::{env_overrides, load_worksheet};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the YAML worksheet
    pub config_path: PathBuf,
}

/// Entry point for `sre-toolkit validate`.
///
/// # Errors
///
/// Returns an error if the worksheet cannot be loaded or planned.
pub fn run(args: &ValidateArgs) -> Result<ExitCode> {
    let env = env_overrides()?;
    let worksheet = load_worksheet(&args.config_path, &env)?;
    let steps = plan(&worksheet.operations)?;

    let s = &worksheet.settings;
    println!(
        "profile={} region={} dry_run={} operations={}",
        s.profile,
        s.region,
        s.dry_run,
        steps.len()
    );
    for (i, step) in steps.iter().enumerate() {
        println!("{:>3}. {}", i + 1, describe(step));
    }
    Ok(ExitCode::SUCCESS)
}

/// One-line description of a planned step.
#[must_use]
pub fn describe(step: &PlannedStep) -> String {
    let op = match step {
        PlannedStep::Rejected(reason) => return format!("skipped: {reason}"),
        PlannedStep::Ready(op) => op,
    };
    let target = match op {
        Operation::StartInstance(p) | Operation::StopInstance(p) => p.instance_id.clone(),
        Operation::SnapshotVolume(p) => p.volume_id.clone(),
        Operation::CleanupSnapshots(p) => format!("older than {} days", p.retention_days),
        Operation::RehydrateInstance(p) => format!("{} -> {}", p.source_instance, p.new_type),
    };
    format!("{} {target}", op.kind())
}
