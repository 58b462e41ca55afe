use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use client_core::{load_settings, UrbanSpaceClient};
use tracing_subscriber::EnvFilter;

mod commands;
mod controller;

use commands::Command;
use controller::{
    events::{ScreenOutcome, UiErrorCategory},
    orchestration,
};

#[derive(Parser, Debug)]
#[command(name = "urbanspace", about = "UrbanSpace furniture storefront and admin console")]
struct Cli {
    /// Overrides `api_url` from urbanspace.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let settings = load_settings()?.with_overrides(cli.api_url.as_deref(), cli.session_file)?;
    tracing::debug!(api = %settings.api_base_url, "resolved client settings");
    let client = UrbanSpaceClient::from_settings(&settings).await;

    match orchestration::run(&client, cli.command).await {
        ScreenOutcome::Render(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        ScreenOutcome::Saved { message, next } => {
            println!("{message}");
            println!("-> {next}");
            Ok(ExitCode::SUCCESS)
        }
        ScreenOutcome::Redirect(route) => {
            eprintln!("Session expired or missing; sign in again.");
            println!("-> {route}");
            Ok(ExitCode::from(2))
        }
        ScreenOutcome::Banner(error) => {
            tracing::debug!(
                context = ?error.context(),
                category = ?error.category(),
                message = error.message(),
                "command failed"
            );
            eprintln!("error: {}", error.banner_text());
            // Unreachable server is worth retrying; everything else is not.
            Ok(match error.category() {
                UiErrorCategory::Transport => ExitCode::from(3),
                _ => ExitCode::FAILURE,
            })
        }
    }
}
