//! errchain CLI binary.
//!
//! Builds an error chain from command-line messages and renders it:
//! - `errchain render` streams the chain to stdout
//! - `errchain config` prints the effective configuration

use clap::Parser;
use errchain::ErrchainConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands};

    let cli = Cli::parse();

    // Logs go to stderr so rendered chains own stdout.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => ErrchainConfig::from_file(path)?,
        None => ErrchainConfig::load()?,
    };

    match cli.command {
        Commands::Render(args) => commands::run_render(&config, args)?,
        Commands::Config => commands::print_config(&config)?,
    }

    Ok(())
}
