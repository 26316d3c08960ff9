//! Suggestions command.

use anyhow::{Context, Result};
use clap::Args;

use repolens_client::AnalysisClient;
use repolens_core::RepoHandle;

use super::Settings;
use crate::output;

#[derive(Args)]
pub struct SuggestionsArgs {
    /// Repo ID returned by `submit`
    pub repo_id: String,

    /// Method name as listed in the analysis
    pub method: String,
}

pub async fn execute(args: SuggestionsArgs, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;
    let handle = RepoHandle::new(args.repo_id);

    let suggestions = client
        .suggestions(&handle, &args.method)
        .await
        .with_context(|| format!("Failed to get suggestions for '{}'", args.method))?;

    if settings.json {
        output::print_json(&suggestions)?;
    } else {
        output::print_suggestions(&suggestions);
    }
    Ok(())
}
