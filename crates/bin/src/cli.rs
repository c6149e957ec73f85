//! CLI argument definitions for the feedvault binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

/// What to do when the feed cannot be read at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnUnreachable {
    /// Use the local cache if present, otherwise start an empty vault
    PreferCache,
    /// Start an empty vault only when nothing is cached
    InitEmpty,
    /// Give up
    Abort,
    /// Ask on the terminal
    Ask,
}

/// feedvault: a password vault synchronized through a signed feed
#[derive(Parser, Debug)]
#[command(name = "feedvault")]
#[command(about = "Client-held encrypted credential vault synchronized through a signed feed")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub vault: VaultArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials and connection settings shared by every command
#[derive(clap::Args, Debug)]
pub struct VaultArgs {
    /// Vault username
    #[arg(short, long, env = "FEEDVAULT_USERNAME")]
    pub username: String,

    /// Vault password
    #[arg(short, long, env = "FEEDVAULT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Feed gateway base URL
    #[arg(
        long,
        default_value = feedvault::constants::DEFAULT_GATEWAY_URL,
        env = "FEEDVAULT_GATEWAY"
    )]
    pub gateway: Url,

    /// Feed topic name (at most 32 bytes)
    #[arg(long, default_value = feedvault::constants::FEED_TOPIC, env = "FEEDVAULT_TOPIC")]
    pub topic: String,

    /// JSON file caching the last sealed vault per username.
    /// Without it the cache lives only for this invocation.
    #[arg(short = 'c', long, env = "FEEDVAULT_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Fallback when the feed is unreachable or has no vault yet
    #[arg(long, default_value = "ask", env = "FEEDVAULT_ON_UNREACHABLE")]
    pub on_unreachable: OnUnreachable,

    /// Timeout for each feed request, in seconds
    #[arg(long, default_value_t = feedvault::constants::DEFAULT_REQUEST_TIMEOUT_SECS, env = "FEEDVAULT_TIMEOUT")]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the feed address derived from the credentials
    Address,
    /// List stored logins
    List,
    /// Show one login, including its password
    Show {
        /// Login id
        id: String,
    },
    /// Add a login
    Add(EntryArgs),
    /// Replace a login
    Update {
        /// Login id
        id: String,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Delete a login
    Delete {
        /// Login id
        id: String,
    },
}

/// Fields of a login entry
#[derive(clap::Args, Debug)]
pub struct EntryArgs {
    /// Display name of the login
    #[arg(long)]
    pub name: String,

    /// Username for the site
    #[arg(long, default_value = "")]
    pub login: String,

    /// Password for the site
    #[arg(long)]
    pub secret: String,
}
