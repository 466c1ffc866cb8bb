//! Intake CLI - multi-step registration with encrypted local draft
//! persistence.
//!
//! This is the command-line interface for Intake. It provides a terminal
//! wizard over the core library's draft lifecycle.

mod cli;
mod commands;
mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use intake_core::VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Start) => commands::start::run(&cli.data_dir, cli.new_session).await,
        Some(Commands::Status { json }) => {
            commands::status::run(&cli.data_dir, cli.new_session, json).await
        }
        Some(Commands::Discard) => commands::misc::discard(&cli.data_dir, cli.new_session).await,
        Some(Commands::Sweep { retention_hours }) => {
            commands::misc::sweep_drafts(&cli.data_dir, retention_hours).await
        }
        None => {
            println!("Intake v{}", VERSION);
            println!("\nRun `intake --help` for usage information.");
            Ok(())
        }
    }
}
