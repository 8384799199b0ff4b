//! Configuration structures for Mender.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Repository to watch
    #[serde(default)]
    pub target: TargetConfig,

    /// Monitoring behavior
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// CI platform client configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Classification oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Retry policy for platform calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Repository under watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TargetConfig {
    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            owner: String::default(),
            repo: String::default(),
            branch: default_branch(),
        }
    }
}

/// Monitoring behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Maximum failed runs ingested per pass
    #[serde(default = "default_max_failed_runs")]
    pub max_failed_runs: usize,

    /// Seconds between passes in watch mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_max_failed_runs() -> usize {
    10
}

const fn default_interval_secs() -> u64 {
    300
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_failed_runs: default_max_failed_runs(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// CI platform client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Bearer token (falls back to the GITHUB_TOKEN env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Base URL (overridable for testing/proxies)
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// Request timeout for platform reads
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_github_timeout_secs() -> u64 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_github_base_url(),
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

/// Classification oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// Chat endpoint base URL
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Output-length cap per classification
    #[serde(default = "default_oracle_max_tokens")]
    pub max_tokens: u32,

    /// Fixed to 0.0 for deterministic classifications
    #[serde(default)]
    pub temperature: f64,

    /// Request timeout for oracle calls
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,

    /// Character budget of log text per classification request
    #[serde(default = "default_log_excerpt_chars")]
    pub log_excerpt_chars: usize,
}

fn default_oracle_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_oracle_model() -> String {
    "qwen2.5-coder:3b".to_string()
}

const fn default_oracle_max_tokens() -> u32 {
    4096
}

const fn default_oracle_timeout_secs() -> u64 {
    120
}

const fn default_log_excerpt_chars() -> usize {
    6000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            model: default_oracle_model(),
            max_tokens: default_oracle_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_oracle_timeout_secs(),
            log_excerpt_chars: default_log_excerpt_chars(),
        }
    }
}

/// Retry policy configuration for platform calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff delay in seconds
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,

    /// Maximum backoff delay in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_secs() -> u64 {
    2
}

const fn default_max_backoff_secs() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
