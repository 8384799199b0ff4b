//! Configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Repository owner must be set (target.owner or --owner)")]
    MissingOwner,

    #[error("Repository name must be set (target.repo or --repo)")]
    MissingRepo,

    #[error("Invalid max_failed_runs: {0}. Must be at least 1")]
    InvalidMaxFailedRuns(usize),

    #[error("Invalid monitoring interval: {0}s. Must be at least 1")]
    InvalidInterval(u64),

    #[error("Invalid max_attempts: {0}. Cannot be 0")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_secs ({0}) must not exceed max_backoff_secs ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid oracle temperature: {0}. Must be within [0.0, 2.0]")]
    InvalidTemperature(f64),

    #[error("Oracle log excerpt budget cannot be 0")]
    EmptyLogBudget,
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mender/config.yaml (project config)
    /// 3. .mender/local.yaml (project local overrides, optional)
    /// 4. Environment variables (MENDER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".mender/config.yaml"))
            .merge(Yaml::file(".mender/local.yaml"))
            .merge(Env::prefixed("MENDER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Ok(config)
    }

    /// Validate a fully merged configuration before a pass starts.
    ///
    /// The target fields are validated here rather than at load time so
    /// that `--owner`/`--repo` CLI overrides can be applied first.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.target.owner.trim().is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        if config.target.repo.trim().is_empty() {
            return Err(ConfigError::MissingRepo);
        }

        if config.monitor.max_failed_runs == 0 {
            return Err(ConfigError::InvalidMaxFailedRuns(
                config.monitor.max_failed_runs,
            ));
        }
        if config.monitor.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval(config.monitor.interval_secs));
        }

        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }
        if config.retry.initial_backoff_secs > config.retry.max_backoff_secs {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_secs,
                config.retry.max_backoff_secs,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if !(0.0..=2.0).contains(&config.oracle.temperature) {
            return Err(ConfigError::InvalidTemperature(config.oracle.temperature));
        }
        if config.oracle.log_excerpt_chars == 0 {
            return Err(ConfigError::EmptyLogBudget);
        }

        Ok(())
    }
}
