//! Native-messaging host launched by the browser.
//!
//! stdout carries the framed protocol, so all logging goes to stderr.

use anyhow::Result;
use flamingo_bridge::host::{self, Forwarder, HostConfig};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Browsers pass the caller origin (and on Windows a window handle); neither is needed.
    let caller = std::env::args().nth(1);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = HostConfig::load();
    debug!(endpoint = %config.endpoint, has_token = !config.token.is_empty(), "host config loaded");
    info!(?caller, "native host starting");

    let forwarder = Forwarder::new(config)?;
    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    host::serve(&mut stdin, &mut stdout, &forwarder).await?;
    Ok(())
}
