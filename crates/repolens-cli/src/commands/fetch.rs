//! Fetch command.

use anyhow::{Context, Result};
use clap::Args;

use repolens_client::{poll_until_ready, AnalysisClient, FetchOutcome};
use repolens_core::{RepoHandle, ViewEvent};

use super::Settings;
use crate::output;

#[derive(Args)]
pub struct FetchArgs {
    /// Repo ID returned by `submit`
    pub repo_id: String,

    /// Poll until the analysis is ready instead of asking once
    #[arg(long)]
    pub wait: bool,

    /// Show methods as a table
    #[arg(long)]
    pub table: bool,
}

pub async fn execute(args: FetchArgs, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;
    let handle = RepoHandle::new(args.repo_id);

    let result = if args.wait {
        let spinner = super::submit::spinner(settings.json)?;
        spinner.set_message(format!("Waiting for {}", handle));
        let progress = spinner.clone();
        let outcome = poll_until_ready(&client, &handle, &settings.config.poll_policy(), move |event| {
            match event {
                ViewEvent::FetchStarted { attempt, .. } => {
                    progress.set_message(format!("Fetching analysis (attempt {})", attempt));
                }
                ViewEvent::NotReady { .. } => progress.set_message("Analysis not ready yet"),
                _ => {}
            }
        })
        .await;
        spinner.finish_and_clear();
        Some(outcome.with_context(|| format!("Failed to fetch analysis {}", handle))?)
    } else {
        match client
            .fetch(&handle)
            .await
            .with_context(|| format!("Failed to fetch analysis {}", handle))?
        {
            FetchOutcome::Ready(result) => Some(result),
            FetchOutcome::Pending => None,
        }
    };

    match (result, settings.json) {
        (Some(result), true) => output::print_json(&result)?,
        (Some(result), false) if args.table => output::print_result_table(&result),
        (Some(result), false) => output::print_result(&result),
        (None, true) => output::print_json(&serde_json::json!({
            "repo_id": handle,
            "ready": false,
        }))?,
        (None, false) => {
            println!("Analysis of {} is not ready yet.", handle);
        }
    }
    Ok(())
}
