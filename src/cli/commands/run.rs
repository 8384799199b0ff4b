//! `mender run`: one monitoring pass.

use anyhow::{bail, Result};

use crate::cli::output::print_pass;
use crate::cli::types::RunArgs;
use crate::domain::models::{Config, RunStatus};

use super::{apply_target_overrides, build_loop};

pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_target_overrides(&mut config, &args.target);

    let mut control_loop = build_loop(&config).await?;
    control_loop.run_pass().await;

    let state = control_loop.state();
    print_pass(state, json_mode);

    if state.status == RunStatus::Error {
        let message = state
            .last_error
            .as_ref()
            .map_or_else(|| "pass ended in error".to_string(), |e| e.message.clone());
        bail!(message);
    }
    Ok(())
}
