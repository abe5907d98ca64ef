//! Config command handlers: show and update the bridge configuration.

use anyhow::{Result, bail};
use flamingo_bridge::{BridgeService, Config, ConfigPatch};

use crate::cli::ConfigSetArgs;

pub async fn run_config_show_command(service: &BridgeService) -> Result<()> {
    let config = service.config().get().await?;
    print_config(&config);
    Ok(())
}

pub async fn run_config_set_command(service: &BridgeService, args: &ConfigSetArgs) -> Result<()> {
    let transport = if args.native {
        Some(true)
    } else if args.http {
        Some(false)
    } else {
        None
    };
    let patch = ConfigPatch {
        use_native_messaging: transport,
        intercept_allowlist: args.allowlist.clone(),
        native_host: args.native_host.clone(),
        endpoint: args.endpoint.clone(),
        token: args.token.clone(),
        ..ConfigPatch::default()
    };
    if patch.is_empty() {
        bail!("nothing to set; pass at least one option (see --help)");
    }
    service.config().set(&patch).await?;
    run_config_show_command(service).await
}

fn print_config(config: &Config) {
    println!("enabled = {}", config.enabled);
    println!("auto_intercept = {}", config.auto_intercept);
    println!("sniff_media_enabled = {}", config.sniff_media_enabled);
    println!(
        "transport = {}",
        if config.use_native_messaging {
            "native"
        } else {
            "http"
        }
    );
    println!("native_host = {}", config.native_host);
    println!("endpoint = {}", config.endpoint);
    println!(
        "token = {}",
        if config.token.is_empty() {
            "<unset>"
        } else {
            "<set>"
        }
    );
    println!(
        "allowlist = {}",
        if config.intercept_allowlist.is_empty() {
            "<any host>"
        } else {
            config.intercept_allowlist.as_str()
        }
    );
}
