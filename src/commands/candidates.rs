//! Media catalog listing.

use anyhow::Result;
use flamingo_bridge::BridgeService;
use tracing::info;

use super::print_json;

pub async fn run_candidates_list_command(service: &BridgeService) -> Result<()> {
    let items = service.candidates().list().await?;
    print_json(&items)
}

pub async fn run_candidates_clear_command(service: &BridgeService) -> Result<()> {
    service.candidates().clear().await?;
    info!("media candidates cleared");
    Ok(())
}
