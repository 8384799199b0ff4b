//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mender")]
#[command(about = "Mender - CI failure monitor and self-healing control loop", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single monitoring pass
    Run(RunArgs),

    /// Run monitoring passes repeatedly on an interval
    Watch(WatchArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Target/override options shared by `run` and `watch`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository owner (overrides config)
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Repository name (overrides config)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Branch to watch (overrides config)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Maximum failed runs ingested per pass (overrides config)
    #[arg(long)]
    pub max_runs: Option<usize>,

    /// Load configuration from this file instead of the default chain
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Seconds between passes (overrides config)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many passes
    #[arg(long)]
    pub max_passes: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Load configuration from this file instead of the default chain
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,
}
