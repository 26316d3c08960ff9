//! Authentication commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Password};

use repolens_client::AnalysisClient;
use repolens_core::analysis::{AccessToken, Credentials};
use repolens_core::LensConfig;

use super::Settings;
use crate::output;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in with an existing account
    Login(AuthArgs),

    /// Register a new account
    Signin(AuthArgs),
}

#[derive(Args)]
pub struct AuthArgs {
    /// Account email (prompted when omitted)
    #[arg(long)]
    pub email: Option<String>,

    /// Store the access token in the config file
    #[arg(long)]
    pub save: bool,
}

pub async fn execute(cmd: AuthCommands, settings: &Settings) -> Result<()> {
    let client = AnalysisClient::new(&settings.config)?;

    let (token, args) = match cmd {
        AuthCommands::Login(args) => {
            let credentials = prompt_credentials(&args, false)?;
            (client.login(&credentials).await.context("Login failed")?, args)
        }
        AuthCommands::Signin(args) => {
            let credentials = prompt_credentials(&args, true)?;
            (client.signin(&credentials).await.context("Sign-in failed")?, args)
        }
    };

    if args.save {
        save_token(settings, &token)?;
    }

    if settings.json {
        output::print_json(&token)?;
    } else if args.save {
        println!("{} Token saved.", "✓".green());
    } else {
        println!("{}", token.access_token);
    }
    Ok(())
}

fn prompt_credentials(args: &AuthArgs, confirm: bool) -> Result<Credentials> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    let password = prompt.interact()?;

    Ok(Credentials { email, password })
}

/// Write the token into the config file, leaving its other values alone.
fn save_token(settings: &Settings, token: &AccessToken) -> Result<()> {
    let path = settings
        .path
        .as_deref()
        .context("No config path available; pass --config")?;

    let mut config = LensConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.token = Some(token.access_token.clone());
    config
        .save(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Saved access token");
    Ok(())
}
