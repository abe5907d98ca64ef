//! Quick state and switches.

use anyhow::Result;
use flamingo_bridge::{BridgeService, ConfigPatch};

use super::print_json;
use crate::cli::FlagsArgs;

pub async fn run_state_command(service: &BridgeService) -> Result<()> {
    let state = service.quick_state().await?;
    print_json(&state)
}

pub async fn run_flags_command(service: &BridgeService, args: &FlagsArgs) -> Result<()> {
    let patch = ConfigPatch {
        enabled: args.enabled,
        sniff_media_enabled: args.sniff,
        auto_intercept: args.auto_intercept,
        ..ConfigPatch::default()
    };
    if !patch.is_empty() {
        service.config().set(&patch).await?;
    }
    run_state_command(service).await
}
