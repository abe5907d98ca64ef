//! CLI command handlers.

mod candidates;
mod config;
mod dispatch;
mod state;

pub use candidates::{run_candidates_clear_command, run_candidates_list_command};
pub use config::{run_config_set_command, run_config_show_command};
pub use dispatch::{run_detect_command, run_intercept_command, run_ping_command, run_send_command};
pub use state::{run_flags_command, run_state_command};

use anyhow::Result;
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
