//! `mender watch`: repeated monitoring passes on an interval.

use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cli::output::print_pass;
use crate::cli::types::WatchArgs;
use crate::domain::models::{Config, RunStatus};

use super::{apply_target_overrides, build_loop};

pub async fn execute(args: WatchArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_target_overrides(&mut config, &args.target);
    if let Some(interval) = args.interval {
        config.monitor.interval_secs = interval;
    }

    let mut control_loop = build_loop(&config).await?;
    let interval = Duration::from_secs(config.monitor.interval_secs);

    if !json_mode {
        println!(
            "Watching {} (branch {}) every {}s. Press Ctrl-C to stop.",
            config.target.owner.clone() + "/" + &config.target.repo,
            config.target.branch,
            interval.as_secs()
        );
    }

    let mut passes: u64 = 0;
    loop {
        control_loop.run_pass().await;
        passes += 1;
        print_pass(control_loop.state(), json_mode);

        if control_loop.state().status == RunStatus::Error {
            let message = control_loop
                .state()
                .last_error
                .as_ref()
                .map_or_else(|| "pass ended in error".to_string(), |e| e.message.clone());
            bail!(message);
        }
        if let Some(max_passes) = args.max_passes {
            if passes >= max_passes {
                info!(passes, "reached pass limit, stopping watch");
                return Ok(());
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!(passes, "interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
