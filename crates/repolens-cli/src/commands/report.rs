//! Report command.

use anyhow::{Context, Result};
use clap::Args;

use repolens_client::AnalysisClient;
use repolens_core::RepoHandle;

use super::Settings;
use crate::output;

#[derive(Args)]
pub struct ReportArgs {
    /// Repo ID returned by `submit`
    pub repo_id: String,
}

pub async fn execute(args: ReportArgs, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;
    let handle = RepoHandle::new(args.repo_id);

    let report = client
        .report(&handle)
        .await
        .with_context(|| format!("Failed to get report for {}", handle))?;

    if settings.json {
        output::print_json(&report)?;
    } else {
        output::print_report(&report);
    }
    Ok(())
}
