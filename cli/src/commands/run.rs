//! Run command — load a worksheet and execute it against the cloud.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::application::services::engine::{ErrorPolicy, run_worksheet};
use crate::application::{RunContext, cancel_pair};
use crate::domain::RunSummary;
use crate::infra::aws_cli::{AwsCliContext, DEFAULT_AWS_CLI};
use crate::infra::reporter::TracingReporter;
use crate::infra::worksheet::{env_overrides, load_worksheet};

/// Exit code for a completed run with failed or rejected steps under
/// `--fail-on-error`.
pub const EXIT_STEP_FAILURES: u8 = 2;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Path to the YAML worksheet
    pub config_path: PathBuf,

    /// Abort the run at the first failed or rejected operation
    #[arg(long)]
    pub stop_on_error: bool,

    /// Exit with status 2 if any operation failed or was rejected
    #[arg(long)]
    pub fail_on_error: bool,

    /// Cloud CLI executable
    #[arg(long, env = "SRE_TOOLKIT_AWS_CLI", default_value = DEFAULT_AWS_CLI)]
    pub aws_cli: String,
}

/// Entry point for `sre-toolkit run`.
///
/// # Errors
///
/// Returns an error if the worksheet cannot be loaded or planned. Step
/// failures are reported through the log, not returned.
pub async fn run(args: &RunArgs) -> Result<ExitCode> {
    let env = env_overrides()?;
    let worksheet = load_worksheet(&args.config_path, &env)?;
    let cloud = AwsCliContext::default_runner(args.aws_cli.as_str(), &worksheet.settings);
    tracing::info!(
        profile = %cloud.profile(),
        region = %cloud.region(),
        dry_run = worksheet.settings.dry_run,
        operations = worksheet.operations.len(),
        "starting run"
    );

    let (handle, signal) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current operation");
            handle.cancel();
        }
    });

    let ctx = RunContext::new(&cloud, worksheet.settings.dry_run, signal);
    let policy = if args.stop_on_error {
        ErrorPolicy::Stop
    } else {
        ErrorPolicy::Continue
    };
    let result = run_worksheet(&worksheet, &ctx, policy, &TracingReporter).await;
    interrupt.abort();

    Ok(exit_code(&result?, args.fail_on_error))
}

/// Map a finished run to the process exit code.
#[must_use]
pub fn exit_code(summary: &RunSummary, fail_on_error: bool) -> ExitCode {
    if fail_on_error && summary.has_failures() {
        ExitCode::from(EXIT_STEP_FAILURES)
    } else {
        ExitCode::SUCCESS
    }
}
