//! Mender CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mender::cli::{Cli, Commands};
use mender::domain::models::LoggingConfig;
use mender::infrastructure::config::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Run(args) => args.target.config.clone(),
        Commands::Watch(args) => args.target.config.clone(),
        Commands::Config(args) => args.config.clone(),
    };
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(&path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => mender::cli::handle_error(err, cli.json),
    };

    init_tracing(&config.logging);

    let result = match cli.command {
        Commands::Run(args) => mender::cli::commands::run::execute(args, config, cli.json).await,
        Commands::Watch(args) => {
            mender::cli::commands::watch::execute(args, config, cli.json).await
        }
        Commands::Config(args) => mender::cli::commands::config::execute(args, config, cli.json),
    };

    if let Err(err) = result {
        mender::cli::handle_error(err, cli.json);
    }
}

/// RUST_LOG wins; the configured level is the fallback.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
