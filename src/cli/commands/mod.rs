//! CLI command implementations.

pub mod config;
pub mod run;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::types::TargetArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::github::{GitHubClient, GitHubClientConfig};
use crate::infrastructure::oracle::OracleClient;
use crate::services::ControlLoop;

/// Fold CLI target overrides into the loaded configuration.
pub(crate) fn apply_target_overrides(config: &mut Config, args: &TargetArgs) {
    if let Some(owner) = &args.owner {
        config.target.owner = owner.clone();
    }
    if let Some(repo) = &args.repo {
        config.target.repo = repo.clone();
    }
    if let Some(branch) = &args.branch {
        config.target.branch = branch.clone();
    }
    if let Some(max_runs) = args.max_runs {
        config.monitor.max_failed_runs = max_runs;
    }
}

/// Construct the clients and the control loop from a validated config.
///
/// Clients are built exactly once here and injected; stages never reach
/// for a global connection.
pub(crate) async fn build_loop(config: &Config) -> Result<ControlLoop> {
    ConfigLoader::validate(config)?;

    let github = GitHubClient::new(
        GitHubClientConfig::resolve(&config.github, &config.retry)
            .context("GitHub client configuration")?,
    )?;
    let oracle = OracleClient::new(&config.oracle).context("oracle client configuration")?;

    match github.get_repo(&config.target.owner, &config.target.repo).await {
        Ok(repo) => info!(
            repo = %repo.full_name,
            default_branch = %repo.default_branch,
            "repository resolved"
        ),
        // Monitoring absorbs platform errors into the run state, so a
        // failed lookup here is advisory only.
        Err(err) => warn!(error = %err, "could not resolve repository"),
    }
    match oracle.verify_connection().await {
        Ok(()) => {}
        // Classification falls back gracefully, so a missing oracle
        // degrades the pass instead of blocking it.
        Err(err) => warn!(error = %err, "oracle unavailable, classifications will fall back"),
    }
    match github.rate_limit_status().await {
        Ok(quota) => info!(
            remaining = quota.remaining,
            limit = quota.limit,
            reset_at = ?quota.reset_at(),
            "GitHub API quota"
        ),
        Err(err) => warn!(error = %err, "could not read GitHub API quota"),
    }

    let mut control_loop = ControlLoop::from_config(config, github, Arc::new(oracle));
    control_loop.initialize()?;
    Ok(control_loop)
}
