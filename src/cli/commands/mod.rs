//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `watch`: poll the player and match every track change
//! - `search`: one-off round for an explicit track
//! - `providers`: list, enable and disable catalog providers
//! - `secrets`: store credentials and inspect the player bridge

mod providers;
mod search;
mod secrets;
mod watch;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::matching::{
    EnablementPolicy, MatchingManager, PersistedPolicy, ResultStore, SettingsPolicy, registry,
};
use crate::secrets::{ChainedSecretStore, SecretStore};

pub use providers::{cmd_providers, cmd_set_enabled};
pub use search::cmd_search;
pub use secrets::{cmd_clear_secret, cmd_now_playing, cmd_set_secret};
pub use watch::cmd_watch;

/// Tracklink CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/tracklink/config.toml)
    #[arg(long, global = true, env = "TRACKLINK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Follow the local player and find every track on each enabled service (default)
    Watch,
    /// Find one track on every enabled service
    Search {
        /// Track title
        #[arg(long)]
        title: String,
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Album name
        #[arg(long)]
        album: Option<String>,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
    /// List providers with their configured/enabled state
    Providers,
    /// Enable a provider (by name or slug, e.g. youtube_music)
    Enable { provider: String },
    /// Disable a provider (by name or slug, e.g. youtube_music)
    Disable { provider: String },
    /// Store a provider credential in the OS keyring
    SetSecret {
        /// One of spotify.client_id, spotify.client_secret, youtube.api_key
        key: String,
        value: String,
    },
    /// Remove a provider credential from the OS keyring
    ClearSecret { key: String },
    /// Poll the player once and print what it reports
    NowPlaying,
}

/// Run the specified CLI command. No subcommand means `watch`.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config_path = cli.config.clone().or_else(config::config_path);
    let config = match &config_path {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match cli.command.as_ref().unwrap_or(&Commands::Watch) {
        Commands::Watch => cmd_watch(&rt, &config, config_path.as_deref()),
        Commands::Search {
            title,
            artist,
            album,
            json,
        } => cmd_search(
            &rt,
            &config,
            config_path.as_deref(),
            title,
            artist,
            album.as_deref(),
            *json,
        ),
        Commands::Providers => cmd_providers(&config, config_path.as_deref()),
        Commands::Enable { provider } => {
            cmd_set_enabled(config, config_path.as_deref(), provider, true)
        }
        Commands::Disable { provider } => {
            cmd_set_enabled(config, config_path.as_deref(), provider, false)
        }
        Commands::SetSecret { key, value } => cmd_set_secret(key, value),
        Commands::ClearSecret { key } => cmd_clear_secret(key),
        Commands::NowPlaying => cmd_now_playing(&config),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Everything a matching session needs, wired from config.
pub(crate) struct Session {
    pub manager: Arc<MatchingManager>,
    pub policy: Arc<dyn EnablementPolicy>,
}

/// Build secrets, providers, policy and manager from `config`.
///
/// With a `config_path`, provider toggles are re-read from that file at every
/// round. Reads the OS keyring, so call it before entering the runtime.
pub(crate) fn build_session(config: &Config, config_path: Option<&Path>) -> anyhow::Result<Session> {
    let secrets: Arc<dyn SecretStore> = Arc::new(ChainedSecretStore::standard(&config.credentials));
    let http = registry::build_http_client(&config.http)?;
    let providers = registry::build_providers(config, secrets, http);
    let policy: Arc<dyn EnablementPolicy> = match config_path {
        Some(path) => Arc::new(PersistedPolicy::new(path, &config.providers)),
        None => Arc::new(SettingsPolicy::from_config(&config.providers)),
    };

    let manager = MatchingManager::new(providers, Arc::clone(&policy), Arc::new(ResultStore::new()))?;

    Ok(Session {
        manager: Arc::new(manager),
        policy,
    })
}
