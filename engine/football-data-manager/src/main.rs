//! Football data manager binary

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use football_data_manager::cli::{Cli, CliHandler};
use football_data_manager::{initialize_logging_with_config, load_config, validate_config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
        validate_config(&config)?;
    }

    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;
    info!("Starting football data manager v{}", env!("CARGO_PKG_VERSION"));

    CliHandler::new(config).handle_command(cli.command).await
}
