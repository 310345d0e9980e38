mod domain;
mod clients;

mod app_system;
mod backend;
mod cli;
mod config;
mod error;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod allocator;
mod composer;
mod totals;

use clap::Parser;
use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, AdminSystem};
use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _env = dotenvy::dotenv();
    setup_tracing();

    let cli = Cli::parse();
    info!(backend = ?cli.config().backend, api_url = %cli.config().api_url, "Starting admin panel");

    let system = AdminSystem::new(cli.config()).map_err(|e| e.to_string())?;

    let span = tracing::info_span!("command");
    let result = cli.run(&system).instrument(span).await;
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }

    system.shutdown().await?;
    result
}
