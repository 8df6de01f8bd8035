//! Which providers take part in a round.
//!
//! A provider is eligible when it is configured (credentials present) and
//! enabled (user toggle). The manager reads this once per round, at dispatch.
//! [`PersistedPolicy`] re-reads the config file at that point, so a toggle
//! saved by `tracklink disable` reaches an already running `watch`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::RwLock;

use super::domain::ProviderId;
use super::traits::Provider;
use crate::config::{self, ProvidersConfig};

/// User opt-in per provider.
pub trait EnablementPolicy: Send + Sync {
    fn is_enabled(&self, provider: &ProviderId) -> bool;

    /// Configured and enabled.
    fn is_eligible(&self, provider: &dyn Provider) -> bool {
        provider.is_configured() && self.is_enabled(provider.id())
    }
}

/// Toggles backed by the `[providers]` config section, changeable at runtime.
#[derive(Debug, Default)]
pub struct SettingsPolicy {
    toggles: RwLock<BTreeMap<String, bool>>,
}

impl SettingsPolicy {
    pub fn from_config(providers: &ProvidersConfig) -> Self {
        Self {
            toggles: RwLock::new(providers.enabled.clone()),
        }
    }

    pub fn set_enabled(&self, provider: &ProviderId, enabled: bool) {
        tracing::info!(provider = %provider, enabled, "Provider toggled");
        self.toggles.write().insert(provider.slug(), enabled);
    }
}

impl EnablementPolicy for SettingsPolicy {
    fn is_enabled(&self, provider: &ProviderId) -> bool {
        self.toggles
            .read()
            .get(&provider.slug())
            .copied()
            .unwrap_or(true)
    }
}

/// Toggles read from the `[providers]` section of a config file on every check.
///
/// An unreadable or unparsable file keeps the last toggles that did load.
#[derive(Debug)]
pub struct PersistedPolicy {
    path: PathBuf,
    last_good: RwLock<ProvidersConfig>,
}

impl PersistedPolicy {
    pub fn new(path: impl Into<PathBuf>, initial: &ProvidersConfig) -> Self {
        Self {
            path: path.into(),
            last_good: RwLock::new(initial.clone()),
        }
    }

    fn toggles(&self) -> ProvidersConfig {
        match config::read_providers(&self.path) {
            Ok(providers) => {
                *self.last_good.write() = providers.clone();
                providers
            }
            Err(e) => {
                tracing::debug!(error = %e, "Keeping previous provider toggles");
                self.last_good.read().clone()
            }
        }
    }
}

impl EnablementPolicy for PersistedPolicy {
    fn is_enabled(&self, provider: &ProviderId) -> bool {
        self.toggles().is_enabled(&provider.slug())
    }
}
