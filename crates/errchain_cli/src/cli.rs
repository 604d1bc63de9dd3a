//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// errchain - build and render causally chained error messages
#[derive(Parser, Debug)]
#[command(name = "errchain")]
#[command(about = "Build and render causally chained error messages", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a chain from messages, innermost first, and render it to stdout
    Render(RenderArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for `errchain render`
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Messages, innermost cause first; each later message wraps the ones before it
    #[arg(required = true)]
    pub messages: Vec<String>,

    /// Text printed before the chain (overrides configuration)
    #[arg(long)]
    pub header: Option<String>,

    /// Text printed after the chain (overrides configuration)
    #[arg(long)]
    pub trailer: Option<String>,

    /// Point at the argument text instead of copying it into owned buffers
    #[arg(long)]
    pub borrowed: bool,

    /// Refuse allocations beyond this many bytes
    #[arg(long)]
    pub limit_bytes: Option<usize>,

    /// Report allocation counters on stderr after destroying the chain
    #[arg(long)]
    pub stats: bool,
}
