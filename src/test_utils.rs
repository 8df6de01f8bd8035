//! Test fixtures shared across module tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{test_manager, yesterday, wait_for};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (manager, _policy, store) = test_manager(vec![MockProvider::new("A").into_arc()]);
//!     manager.observe(PlayerObservation::playing(yesterday()));
//!     wait_for(&store, |s| s.is_settled()).await;
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::matching::{
    EnablementPolicy, MatchingManager, Provider, ResultStore, SettingsPolicy, StoreSnapshot,
    TrackSnapshot,
};

/// The track used throughout the examples in these tests.
pub fn yesterday() -> TrackSnapshot {
    TrackSnapshot::new("Yesterday", "The Beatles", "Help!")
}

/// Manager over `providers` with an all-enabled policy and a fresh store.
///
/// The policy and store are returned so tests can toggle and inspect them.
pub fn test_manager(
    providers: Vec<Arc<dyn Provider>>,
) -> (MatchingManager, Arc<SettingsPolicy>, Arc<ResultStore>) {
    let policy = Arc::new(SettingsPolicy::default());
    let store = Arc::new(ResultStore::new());
    let manager = MatchingManager::new(
        providers,
        Arc::clone(&policy) as Arc<dyn EnablementPolicy>,
        Arc::clone(&store),
    )
    .expect("provider names should be unique");
    (manager, policy, store)
}

/// Wait (up to 2s) until the store satisfies `done`, returning that snapshot.
pub async fn wait_for(
    store: &ResultStore,
    mut done: impl FnMut(&StoreSnapshot) -> bool,
) -> StoreSnapshot {
    let mut changes = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = store.snapshot();
            if done(&snapshot) {
                return snapshot;
            }
            changes.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("store never reached the expected state")
}

/// A config path inside a temporary directory.
///
/// Keep the TempDir alive for the duration of your test.
pub fn temp_config_path() -> (PathBuf, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("tracklink").join("config.toml");
    (path, dir)
}
