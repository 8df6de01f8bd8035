//! Credential lookup for providers.
//!
//! Providers never read configuration directly; they receive an
//! `Arc<dyn SecretStore>` at construction and ask it for their keys.
//! The effective store for the app is a chain: environment variables,
//! then the `[credentials]` config section, then the OS keyring. Keyring
//! lookups block on OS IPC, so the chain reads every known key from the
//! keyring once at startup and answers from memory afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Credentials;

/// Secret key for the Spotify client id.
pub const SPOTIFY_CLIENT_ID: &str = "spotify.client_id";
/// Secret key for the Spotify client secret.
pub const SPOTIFY_CLIENT_SECRET: &str = "spotify.client_secret";
/// Secret key for the YouTube Data API key.
pub const YOUTUBE_API_KEY: &str = "youtube.api_key";

/// Every key the app knows about, with the environment variable that can supply it.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    (SPOTIFY_CLIENT_ID, "SPOTIFY_CLIENT_ID"),
    (SPOTIFY_CLIENT_SECRET, "SPOTIFY_CLIENT_SECRET"),
    (YOUTUBE_API_KEY, "YOUTUBE_API_KEY"),
];

/// Keyring service name; one entry per secret key.
const KEYRING_SERVICE: &str = "tracklink";

/// Synchronous secret lookup.
pub trait SecretStore: Send + Sync {
    /// Value for `key`, if present and non-empty.
    fn get(&self, key: &str) -> Option<String>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Errors writing secrets.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Unknown secret key '{0}'")]
    UnknownKey(String),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Secrets held in memory (seeded from config/env, or built directly in tests).
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the `[credentials]` config section.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let store = Self::new();
        let pairs = [
            (SPOTIFY_CLIENT_ID, &credentials.spotify_client_id),
            (SPOTIFY_CLIENT_SECRET, &credentials.spotify_client_secret),
            (YOUTUBE_API_KEY, &credentials.youtube_api_key),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                store.set(key, value);
            }
        }
        store
    }

    /// Seed from process environment variables (see [`KNOWN_KEYS`]).
    pub fn from_env() -> Self {
        let store = Self::new();
        for (key, var) in KNOWN_KEYS {
            if let Ok(value) = std::env::var(var) {
                store.set(key, &value);
            }
        }
        store
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Secrets in the OS credential store (Keychain, Secret Service, Credential Manager).
#[derive(Debug, Default)]
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    fn entry(key: &str) -> Result<keyring::Entry, SecretError> {
        keyring::Entry::new(KEYRING_SERVICE, key)
            .map_err(|e| SecretError::Keyring(format!("failed to create keyring entry: {e}")))
    }

    /// Store `value` under `key`. Only keys in [`KNOWN_KEYS`] are accepted.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        if !KNOWN_KEYS.iter().any(|(known, _)| *known == key) {
            return Err(SecretError::UnknownKey(key.to_string()));
        }
        Self::entry(key)?
            .set_password(value)
            .map_err(|e| SecretError::Keyring(format!("failed to set keyring password: {e}")))
    }

    /// Remove `key` from the keyring; a missing entry is not an error.
    pub fn delete(&self, key: &str) -> Result<(), SecretError> {
        match Self::entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::Keyring(format!(
                "failed to delete keyring password: {e}"
            ))),
        }
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = Self::entry(key).ok()?;
        match entry.get_password() {
            Ok(value) if !value.trim().is_empty() => Some(value),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "Keyring lookup failed");
                None
            }
        }
    }
}

/// Remembers every answer of an inner store, misses included.
pub struct CachedSecretStore {
    inner: Arc<dyn SecretStore>,
    cache: RwLock<HashMap<String, Option<String>>>,
}

impl CachedSecretStore {
    pub fn new(inner: Arc<dyn SecretStore>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Look up every key in [`KNOWN_KEYS`] now.
    pub fn preload(self) -> Self {
        for (key, _) in KNOWN_KEYS {
            self.get(key);
        }
        self
    }
}

impl SecretStore for CachedSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.cache.read().get(key) {
            return value.clone();
        }
        let value = self.inner.get(key);
        self.cache.write().insert(key.to_string(), value.clone());
        value
    }
}

/// First store with a value wins.
#[derive(Default)]
pub struct ChainedSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainedSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Environment, then config credentials, then the OS keyring.
    ///
    /// Blocks while the keyring is read; call it outside async tasks.
    pub fn standard(credentials: &Credentials) -> Self {
        Self::new(vec![
            Arc::new(MemorySecretStore::from_env()),
            Arc::new(MemorySecretStore::from_credentials(credentials)),
            Arc::new(CachedSecretStore::new(Arc::new(KeyringSecretStore)).preload()),
        ])
    }
}

impl SecretStore for ChainedSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|store| store.get(key))
    }
}
