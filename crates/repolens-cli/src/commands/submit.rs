//! Submit command.

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use repolens_client::{AnalysisClient, AnalysisSession};
use repolens_core::{PollPolicy, Submission, ViewModel, ViewState};

use super::Settings;
use crate::output;

#[derive(Args)]
pub struct SubmitArgs {
    /// Repository URL to analyze
    pub url: String,

    /// Print the repo ID and exit without waiting for the result
    #[arg(long)]
    pub no_wait: bool,

    /// Make a single result request after this many seconds instead of polling
    #[arg(long, value_name = "SECS")]
    pub fixed_delay: Option<u64>,
}

pub async fn execute(args: SubmitArgs, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;

    if args.no_wait {
        let handle = client
            .submit(&Submission::new(args.url.as_str()))
            .await
            .context("Submission failed")?;
        if settings.json {
            output::print_json(&serde_json::json!({
                "repo_url": args.url,
                "repo_id": handle,
            }))?;
        } else {
            output::print_submitted(&args.url, &handle);
        }
        return Ok(());
    }

    let policy = match args.fixed_delay {
        Some(secs) => PollPolicy::fixed(Duration::from_secs(secs)),
        None => settings.config.poll_policy(),
    };
    let session = AnalysisSession::new(Arc::new(client), policy);
    let mut rx = session.subscribe();

    let spinner = spinner(settings.json)?;
    spinner.set_message(format!("Submitting {}", args.url));

    if let Err(e) = session.submit(args.url.as_str()).await {
        spinner.finish_and_clear();
        return Err(e).context("Submission failed");
    }

    let state = loop {
        let state = rx.borrow_and_update().clone();
        if state.is_terminal() {
            break state;
        }
        spinner.set_message(output::progress_message(&state));
        rx.changed().await.context("Session closed before the analysis finished")?;
    };
    spinner.finish_and_clear();

    if settings.json {
        output::print_json(&state)?;
    }
    // The error is reported once, by the returned error.
    if let ViewState::Failed { error, .. } = &state {
        bail!("Analysis failed: {}", error);
    }
    if !settings.json {
        output::print_view(&ViewModel::from_state(&state));
    }
    Ok(())
}

/// Spinner on stderr; hidden for JSON output.
pub(crate) fn spinner(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {elapsed:.dim}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}
