//! SRE Toolkit - Declarative runbooks for cloud infrastructure maintenance

use std::process::ExitCode;

use clap::Parser;

use sre_toolkit::cli::Cli;
use sre_toolkit::infra::logging;
use sre_toolkit::infra::worksheet::load_dotenv;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = load_dotenv();
    let cli = Cli::parse();
    logging::init(cli.log_level.directive());
    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable environment file"),
    }
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
