//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use repolens_client::{AnalysisClient, AnalysisSession};

use super::Settings;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;
    let session = Arc::new(AnalysisSession::new(
        Arc::new(client),
        settings.config.poll_policy(),
    ));

    println!();
    println!("  {} {}", "Repolens".cyan().bold(), "Web View".bold());
    println!();
    println!("  {}     http://{}:{}", "Page".green(), args.host, args.port);
    println!("  {}      http://{}:{}/api/state", "API".green(), args.host, args.port);
    println!("  {}  {}", "Backend".green(), settings.config.api_base());
    if let Some(log) = &args.log {
        println!("  {}      {}", "Log".green(), log.display());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    repolens_web::run_server(session, &args.host, args.port).await
}
