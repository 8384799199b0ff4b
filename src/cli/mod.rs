//! Command-line interface for Mender.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

/// Report a fatal CLI error and exit nonzero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
