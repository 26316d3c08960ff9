//! Repolens CLI
//!
//! Submit a repository for complexity analysis, follow its progress and
//! read the result from the terminal or a small web view.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{Cli, Commands};

/// Initialize tracing with optional file logging.
///
/// Console output always goes to stderr so stdout stays clean for results
/// and `--json`. The returned guard flushes the file writer on drop.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "repolens=debug,repolens_web=debug,repolens_client=debug,repolens_core=debug"
    } else {
        "repolens=info,repolens_web=debug,repolens_client=debug"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if let Some(path) = log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let file_name = path
            .file_name()
            .with_context(|| format!("Log path {} has no file name", path.display()))?;

        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        // Log to both stderr and file when --log is used
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) => args.log.clone(),
        _ => None,
    };
    let _guard = init_tracing(log_file.as_deref(), cli.verbose)?;

    cli.execute().await
}
