//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repolens_core::LensConfig;

pub mod auth;
pub mod fetch;
pub mod report;
pub mod serve;
pub mod submit;
pub mod suggestions;

/// Repolens - repository complexity analysis from the terminal
#[derive(Parser)]
#[command(name = "repolens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "REPOLENS_BACKEND_URL")]
    pub backend: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a repository URL for analysis
    Submit(submit::SubmitArgs),

    /// Fetch the analysis of a submitted repository
    Fetch(fetch::FetchArgs),

    /// Show the repository report with every analysed method
    Report(report::ReportArgs),

    /// Show improvement suggestions for one method
    Suggestions(suggestions::SuggestionsArgs),

    /// Log in or register with the backend
    #[command(subcommand)]
    Auth(auth::AuthCommands),

    /// Start the web view
    Serve(serve::ServeArgs),
}

/// Resolved configuration plus where it came from.
pub struct Settings {
    pub config: LensConfig,
    pub path: Option<PathBuf>,
    pub json: bool,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = self.settings()?;

        match self.command {
            Commands::Submit(args) => submit::execute(args, &settings).await,
            Commands::Fetch(args) => fetch::execute(args, &settings).await,
            Commands::Report(args) => report::execute(args, &settings).await,
            Commands::Suggestions(args) => suggestions::execute(args, &settings).await,
            Commands::Auth(cmd) => auth::execute(cmd, &settings).await,
            Commands::Serve(args) => serve::execute(args, &settings).await,
        }
    }

    /// Defaults, then the file, then the environment, then flags.
    fn settings(&self) -> Result<Settings> {
        let path = self.config.clone().or_else(LensConfig::default_path);

        let mut config = match &path {
            Some(path) => LensConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => LensConfig::default(),
        }
        .with_env();

        if let Some(backend) = &self.backend {
            config.backend_url = backend.clone();
        }
        config.validate().context("Invalid configuration")?;

        Ok(Settings {
            config,
            path,
            json: self.json,
        })
    }
}
