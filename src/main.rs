//! CLI entry point for the Flamingo bridge.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use flamingo_bridge::intercept::LoggingDownloads;
use flamingo_bridge::text::system_clock;
use flamingo_bridge::{BridgeService, DispatchBridge, JsonFileStore};
use tracing::debug;

mod cli;
mod commands;

use cli::{Args, CandidatesCommand, Command, ConfigCommand};

/// Settings namespace file inside the state directory.
const SYNC_FILE: &str = "sync.json";
/// Local state namespace file inside the state directory.
const LOCAL_FILE: &str = "local.json";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    if let Command::Detect { url, content_type } = &args.command {
        return Ok(commands::run_detect_command(url, content_type));
    }

    let state_dir = args.state_dir.clone().unwrap_or_else(cli::default_state_dir);
    debug!(state_dir = %state_dir.display(), "using state directory");
    let service = BridgeService::new(
        Arc::new(JsonFileStore::new(state_dir.join(SYNC_FILE))),
        Arc::new(JsonFileStore::new(state_dir.join(LOCAL_FILE))),
        DispatchBridge::new()?,
        Arc::new(LoggingDownloads),
        system_clock(),
    );
    service.on_installed().await?;

    match &args.command {
        Command::State => commands::run_state_command(&service).await?,
        Command::Flags(flags) => commands::run_flags_command(&service, flags).await?,
        Command::Config(ConfigCommand::Show) => commands::run_config_show_command(&service).await?,
        Command::Config(ConfigCommand::Set(set)) => {
            commands::run_config_set_command(&service, set).await?;
        }
        Command::Candidates(CandidatesCommand::List) => {
            commands::run_candidates_list_command(&service).await?;
        }
        Command::Candidates(CandidatesCommand::Clear) => {
            commands::run_candidates_clear_command(&service).await?;
        }
        Command::Send { url, save_dir } => {
            return commands::run_send_command(&service, url, save_dir.as_deref()).await;
        }
        Command::Intercept { url, id } => {
            return commands::run_intercept_command(&service, url, *id).await;
        }
        Command::Ping => return commands::run_ping_command(&service).await,
        Command::Detect { .. } => {}
    }
    Ok(ExitCode::SUCCESS)
}
