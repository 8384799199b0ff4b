//! `mender config`: print the effective configuration.

use anyhow::{Context, Result};

use crate::cli::types::ConfigArgs;
use crate::domain::models::Config;

pub fn execute(_args: ConfigArgs, mut config: Config, json_mode: bool) -> Result<()> {
    // The token never reaches stdout.
    if config.github.token.is_some() {
        config.github.token = Some("***".to_string());
    }

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("serializing configuration")?
        );
    } else {
        print!(
            "{}",
            serde_yaml::to_string(&config).context("serializing configuration")?
        );
    }
    Ok(())
}
