//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tracklink\config.toml
//! - macOS: ~/Library/Application Support/tracklink/config.toml
//! - Linux: ~/.config/tracklink/config.toml
//!
//! The config file is human-readable and editable. Settings are
//! loaded at startup and saved when toggled from the CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::matching::scoring::ScoringWeights;

/// Smallest allowed gap between "now" and token expiry before renewing.
pub const MIN_TOKEN_EXPIRY_BUFFER_SECS: u64 = 60;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (the OS keyring and env vars can supply these too)
    pub credentials: Credentials,

    /// Per-provider user toggles
    pub providers: ProvidersConfig,

    /// Now-playing poll settings
    pub polling: PollingConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,

    /// Matching heuristics
    pub matching: MatchingConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

/// Provider enablement, keyed by provider slug ("spotify", "youtube_music").
///
/// A provider without an entry is enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig {
    pub enabled: BTreeMap<String, bool>,
}

impl ProvidersConfig {
    pub fn is_enabled(&self, slug: &str) -> bool {
        self.enabled.get(slug).copied().unwrap_or(true)
    }

    pub fn set_enabled(&mut self, slug: &str, enabled: bool) {
        self.enabled.insert(slug.to_string(), enabled);
    }
}

/// Now-playing bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Poll interval in milliseconds
    pub interval_ms: u64,

    /// Override for the bridge command (default: osascript on macOS, playerctl elsewhere)
    pub command: Option<String>,

    /// Arguments for `command`
    pub args: Vec<String>,

    /// Longest a single poll may run, in milliseconds
    pub timeout_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            command: None,
            args: Vec::new(),
            timeout_ms: 5000,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(250))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(250))
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub timeout_secs: u64,

    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 12,
            connect_timeout_secs: 5,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

/// Matching heuristics and auth tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Linear score weights for noisy catalogs
    pub weights: ScoringWeights,

    /// How many candidates the fallback search considers
    pub fallback_candidates: u32,

    /// Renew bearer tokens this many seconds before they expire (at least 60)
    pub token_expiry_buffer_secs: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            fallback_candidates: 5,
            token_expiry_buffer_secs: MIN_TOKEN_EXPIRY_BUFFER_SECS,
        }
    }
}

impl MatchingConfig {
    pub fn token_expiry_buffer(&self) -> Duration {
        Duration::from_secs(self.token_expiry_buffer_secs.max(MIN_TOKEN_EXPIRY_BUFFER_SECS))
    }

    pub fn fallback_limit(&self) -> u32 {
        self.fallback_candidates.clamp(1, 50)
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tracklink"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path (same fallback rules as [`load`])
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Read just the `[providers]` toggles from `path`, without logging.
///
/// A missing file means no toggles.
pub fn read_providers(path: &Path) -> Result<ProvidersConfig, ConfigError> {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct Toggles {
        providers: ProvidersConfig,
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ProvidersConfig::default()),
        Err(e) => return Err(ConfigError::Read(path.to_path_buf(), e)),
    };
    let toggles: Toggles =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    Ok(toggles.providers)
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
