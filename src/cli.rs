//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Drive the Flamingo browser bridge core from the command line.
///
/// Reads and writes the same settings and state the browser extension uses,
/// stored as JSON files in a state directory.
#[derive(Parser, Debug)]
#[command(name = "flamingo-bridge")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding sync.json and local.json
    #[arg(long, env = "FLAMINGO_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show switches, catalog size and last bridge activity
    State,

    /// Flip the quick switches
    Flags(FlagsArgs),

    /// Show or change the bridge configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// List or clear captured media candidates
    #[command(subcommand)]
    Candidates(CandidatesCommand),

    /// Check whether a URL looks like media
    Detect {
        url: String,

        /// Response Content-Type to test alongside the URL
        #[arg(long, default_value = "")]
        content_type: String,
    },

    /// Send a URL to the download manager
    Send {
        url: String,

        /// Target directory passed to the download manager
        #[arg(long)]
        save_dir: Option<String>,
    },

    /// Run interception on a synthetic browser download
    Intercept {
        url: String,

        /// Browser download id
        #[arg(long, default_value_t = 1)]
        id: i64,
    },

    /// Check that the bridge is reachable
    Ping,
}

#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagsArgs {
    /// Master switch
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Capture media seen in network responses
    #[arg(long)]
    pub sniff: Option<bool>,

    /// Take over browser downloads automatically
    #[arg(long)]
    pub auto_intercept: Option<bool>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Update one or more settings
    Set(ConfigSetArgs),
}

#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSetArgs {
    /// HTTP bridge endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// HTTP bridge token
    #[arg(long)]
    pub token: Option<String>,

    /// Native-messaging host name or executable path
    #[arg(long)]
    pub native_host: Option<String>,

    /// Deliver through native messaging
    #[arg(long, conflicts_with = "http")]
    pub native: bool,

    /// Deliver through the HTTP bridge
    #[arg(long)]
    pub http: bool,

    /// Comma- or newline-separated hosts allowed for interception
    #[arg(long)]
    pub allowlist: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatesCommand {
    /// Print the catalog, most recent first
    List,
    /// Remove every candidate
    Clear,
}

/// `$XDG_STATE_HOME/flamingo-bridge`, `~/.local/state/flamingo-bridge`,
/// or `./flamingo-bridge` when no home directory is known.
#[must_use]
pub fn default_state_dir() -> PathBuf {
    std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
        })
        .map_or_else(|| PathBuf::from("flamingo-bridge"), |base| base.join("flamingo-bridge"))
}
