//! Carnet CLI - Command-line client for Carnet notes and tasks
//!
//! Signs in against the Carnet backend, keeps the session in the OS
//! keychain, and manages notes, categories, and tasks.

mod cli;
mod commands;
mod config_profiles;
mod context;
mod error;
mod secure_store;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::categories::run_categories;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::notes::run_notes;
use crate::commands::tasks::run_tasks;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("carnet=info,carnet_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();
    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::Auth { command } => run_auth(command, profile, api_url).await,
        Commands::Notes { command } => run_notes(command, profile, api_url).await,
        Commands::Categories { command } => run_categories(command, profile, api_url).await,
        Commands::Tasks { command } => run_tasks(command, profile, api_url).await,
        Commands::Config { command } => run_config(command, profile, api_url),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
