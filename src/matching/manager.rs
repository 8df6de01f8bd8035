//! Fan-out/collect orchestration for one observed track.
//!
//! A round goes Idle -> Dispatching -> Collecting -> Settled:
//! 1. A new track (or a manual refresh) snapshots the eligible providers and
//!    opens a round in the [`ResultStore`], clearing the previous results.
//! 2. Each eligible provider runs in its own task: exact search, then the
//!    fallback search if exact came back empty.
//! 3. Matches are published as tasks finish. Failures are logged and only
//!    mean "no entry for this provider".
//! 4. When every task has finished, the round settles.
//!
//! A newer round never waits for an older one. Old tasks keep running, but
//! the store rejects their writes because their round id is stale.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::domain::{PlayerObservation, ProviderError, SearchMatch, TrackSnapshot};
use super::policy::EnablementPolicy;
use super::store::{ResultStore, RoundId};
use super::traits::Provider;
use crate::error::{Error, Result};

/// Shown when a round has nobody to ask.
pub const NO_PROVIDERS_MESSAGE: &str =
    "No music services are enabled. Add credentials and enable a provider.";

/// A dispatched round. Dropping it does not cancel the round.
pub struct RoundHandle {
    pub round: RoundId,
    handle: JoinHandle<()>,
}

impl RoundHandle {
    /// Wait until the round's coordinating task has finished.
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            error!(round = self.round, error = %e, "Round coordinator failed");
        }
    }
}

/// Drives matching rounds against the registered providers.
///
/// Round-starting methods spawn onto the current Tokio runtime.
pub struct MatchingManager {
    providers: Vec<Arc<dyn Provider>>,
    policy: Arc<dyn EnablementPolicy>,
    store: Arc<ResultStore>,
    /// Last observed searchable track; written only by the observing task
    current: Mutex<Option<TrackSnapshot>>,
}

impl MatchingManager {
    /// Provider names must be unique; they key the result aggregate.
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        policy: Arc<dyn EnablementPolicy>,
        store: Arc<ResultStore>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.id().clone()) {
                return Err(Error::DuplicateProvider(provider.id().to_string()));
            }
        }

        Ok(Self {
            providers,
            policy,
            store,
            current: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn policy(&self) -> &Arc<dyn EnablementPolicy> {
        &self.policy
    }

    /// Providers that are configured and enabled right now.
    pub fn eligible_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers
            .iter()
            .filter(|p| self.policy.is_eligible(p.as_ref()))
            .cloned()
            .collect()
    }

    /// Last observed track, if any.
    pub fn current_track(&self) -> Option<TrackSnapshot> {
        self.current.lock().clone()
    }

    /// Feed one player poll. Starts a round only when the track changed.
    ///
    /// Play/pause changes on the same track only update the store.
    pub fn observe(&self, observation: PlayerObservation) -> Option<RoundHandle> {
        self.store
            .set_playback(observation.track.clone(), observation.is_playing);

        let Some(track) = observation.track.filter(TrackSnapshot::is_searchable) else {
            *self.current.lock() = None;
            return None;
        };

        {
            let mut current = self.current.lock();
            if current.as_ref().is_some_and(|c| c.same_track(&track)) {
                return None;
            }
            *current = Some(track.clone());
        }

        info!(title = %track.title, artist = %track.artist, "Track changed");
        Some(self.start_round(track))
    }

    /// Re-run the current track without waiting for a new observation.
    pub fn refresh(&self) -> Option<RoundHandle> {
        let track = self.current_track()?;
        info!(title = %track.title, artist = %track.artist, "Manual refresh");
        Some(self.start_round(track))
    }

    /// Search an explicit track, making it the current one.
    pub fn search(&self, track: TrackSnapshot) -> RoundHandle {
        *self.current.lock() = Some(track.clone());
        self.start_round(track)
    }

    fn start_round(&self, track: TrackSnapshot) -> RoundHandle {
        let eligible = self.eligible_providers();
        let ids = eligible.iter().map(|p| p.id().clone()).collect();
        let round = self.store.begin_round(track.clone(), ids);

        info!(
            round,
            title = %track.title,
            artist = %track.artist,
            providers = eligible.len(),
            "Dispatching round"
        );

        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(run_round(store, round, track, eligible));
        RoundHandle { round, handle }
    }
}

/// Exact search first, fallback only when exact found nothing (not when it failed).
pub async fn search_provider(
    provider: &dyn Provider,
    track: &TrackSnapshot,
) -> std::result::Result<Option<SearchMatch>, ProviderError> {
    if let Some(found) = provider
        .search_exact(&track.title, &track.artist, &track.album)
        .await?
    {
        return Ok(Some(found));
    }
    debug!(provider = %provider.id(), "Exact search empty, trying fallback");
    provider.search_fallback(&track.title, &track.artist).await
}

/// Coordinating task for one round.
async fn run_round(
    store: Arc<ResultStore>,
    round: RoundId,
    track: TrackSnapshot,
    providers: Vec<Arc<dyn Provider>>,
) {
    if providers.is_empty() {
        warn!(round, "No eligible providers");
        store.fail_round(round, NO_PROVIDERS_MESSAGE);
        return;
    }

    let track = Arc::new(track);
    let mut tasks = JoinSet::new();
    for provider in providers {
        let track = Arc::clone(&track);
        tasks.spawn(async move {
            let outcome = search_provider(provider.as_ref(), &track).await;
            (provider.id().clone(), outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((provider, Ok(Some(found)))) => {
                if store.publish(round, provider.clone(), found) {
                    debug!(round, provider = %provider, "Match published");
                } else {
                    debug!(round, provider = %provider, "Dropped match from superseded round");
                }
            }
            Ok((provider, Ok(None))) => debug!(round, provider = %provider, "No match"),
            Ok((provider, Err(e))) => {
                warn!(round, provider = %provider, error = %e, "Provider search failed");
            }
            Err(e) => error!(round, error = %e, "Provider task panicked"),
        }
    }

    if store.finish_round(round) {
        info!(round, "Round settled");
    } else {
        debug!(round, "Superseded round finished");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use super::*;
    use crate::matching::domain::ProviderId;
    use crate::matching::policy::{PersistedPolicy, SettingsPolicy};
    use crate::matching::traits::mocks::{MockProvider, match_for};
    use crate::test_utils::{test_manager as manager_with, wait_for, yesterday as beatles};

    /// Echoes the queried title back, sleeping per-title to order rounds.
    struct EchoProvider {
        id: ProviderId,
        delays: HashMap<String, Duration>,
    }

    #[async_trait]
    impl Provider for EchoProvider {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn search_exact(
            &self,
            title: &str,
            artist: &str,
            album: &str,
        ) -> std::result::Result<Option<SearchMatch>, ProviderError> {
            if let Some(delay) = self.delays.get(title) {
                tokio::time::sleep(*delay).await;
            }
            Ok(Some(SearchMatch {
                provider: self.id.clone(),
                track_id: title.to_string(),
                title: title.to_string(),
                artist: artist.to_string(),
                album: album.to_string(),
                share_url: format!("https://echo/{title}"),
                web_url: None,
                app_url: None,
            }))
        }

        async fn search_fallback(
            &self,
            _title: &str,
            _artist: &str,
        ) -> std::result::Result<Option<SearchMatch>, ProviderError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_exact_and_fallback_matches_aggregate() {
        let (manager, _, store) = manager_with(vec![
            MockProvider::exact_match("Provider1", "https://service1/track/abc").into_arc(),
            MockProvider::fallback_match("Provider2", "https://service2/watch?v=xyz").into_arc(),
        ]);

        manager
            .observe(PlayerObservation::playing(beatles()))
            .unwrap()
            .settled()
            .await;

        let snap = store.snapshot();
        assert!(!snap.searching);
        assert!(snap.error.is_none());
        assert_eq!(snap.results.len(), 2);
        assert_eq!(
            snap.results[&ProviderId::new("Provider1")].share_url,
            "https://service1/track/abc"
        );
        assert_eq!(
            snap.results[&ProviderId::new("Provider2")].share_url,
            "https://service2/watch?v=xyz"
        );
    }

    #[tokio::test]
    async fn test_failing_provider_is_absent_without_error() {
        let failing = Arc::new(MockProvider::failing(
            "Broken",
            ProviderError::SearchFailed("HTTP 500".to_string()),
        ));
        let (manager, _, store) = manager_with(vec![
            Arc::clone(&failing) as Arc<dyn Provider>,
            MockProvider::exact_match("Good", "https://good/1").into_arc(),
        ]);

        manager.search(beatles()).settled().await;

        let snap = store.snapshot();
        assert_eq!(snap.results.len(), 1);
        assert!(snap.results.contains_key(&ProviderId::new("Good")));
        assert!(snap.error.is_none());
        // An exact-search error must not fall through to the fallback
        assert_eq!(failing.fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_only_eligible_providers_dispatched() {
        let disabled = Arc::new(MockProvider::exact_match("Disabled", "https://d/1"));
        let unconfigured = Arc::new(MockProvider::exact_match("Unconfigured", "https://u/1").unconfigured());
        let (manager, policy, store) = manager_with(vec![
            Arc::clone(&disabled) as Arc<dyn Provider>,
            Arc::clone(&unconfigured) as Arc<dyn Provider>,
            MockProvider::exact_match("Enabled", "https://e/1").into_arc(),
        ]);
        policy.set_enabled(&ProviderId::new("Disabled"), false);

        manager.search(beatles()).settled().await;

        let snap = store.snapshot();
        assert_eq!(snap.dispatched, vec![ProviderId::new("Enabled")]);
        assert_eq!(snap.results.keys().collect::<Vec<_>>(), vec![&ProviderId::new("Enabled")]);
        assert_eq!(disabled.total_calls(), 0);
        assert_eq!(unconfigured.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_disabling_then_refresh_drops_provider() {
        let (manager, policy, store) = manager_with(vec![
            MockProvider::exact_match("Spotify", "https://s/1").into_arc(),
            MockProvider::exact_match("YouTube Music", "https://y/1").into_arc(),
        ]);

        manager
            .observe(PlayerObservation::playing(beatles()))
            .unwrap()
            .settled()
            .await;
        assert_eq!(store.snapshot().results.len(), 2);

        policy.set_enabled(&ProviderId::new("YouTube Music"), false);
        manager.refresh().unwrap().settled().await;

        let snap = store.snapshot();
        assert_eq!(snap.results.len(), 1);
        assert!(!snap.results.contains_key(&ProviderId::new("YouTube Music")));
    }

    #[tokio::test]
    async fn test_toggle_saved_to_config_applies_on_refresh() {
        let (path, _dir) = crate::test_utils::temp_config_path();
        let mut config = crate::config::Config::default();
        crate::config::save_to(&config, &path).unwrap();

        let youtube = Arc::new(MockProvider::exact_match("YouTube Music", "https://y/1"));
        let store = Arc::new(ResultStore::new());
        let manager = MatchingManager::new(
            vec![
                MockProvider::exact_match("Spotify", "https://s/1").into_arc(),
                Arc::clone(&youtube) as Arc<dyn Provider>,
            ],
            Arc::new(PersistedPolicy::new(&path, &config.providers)),
            Arc::clone(&store),
        )
        .unwrap();

        manager
            .observe(PlayerObservation::playing(beatles()))
            .unwrap()
            .settled()
            .await;
        assert_eq!(store.snapshot().results.len(), 2);

        config.providers.set_enabled("youtube_music", false);
        crate::config::save_to(&config, &path).unwrap();
        manager.refresh().unwrap().settled().await;

        let snap = store.snapshot();
        assert_eq!(snap.results.len(), 1);
        assert!(!snap.results.contains_key(&ProviderId::new("YouTube Music")));
        assert_eq!(youtube.exact_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_eligible_providers_sets_error() {
        let (manager, policy, store) =
            manager_with(vec![MockProvider::exact_match("Only", "https://o/1").into_arc()]);
        policy.set_enabled(&ProviderId::new("Only"), false);

        manager.search(beatles()).settled().await;

        let snap = store.snapshot();
        assert!(!snap.searching);
        assert!(!snap.has_results());
        assert_eq!(snap.error.as_deref(), Some(NO_PROVIDERS_MESSAGE));
    }

    #[tokio::test]
    async fn test_same_track_and_pause_do_not_retrigger() {
        let provider = Arc::new(MockProvider::exact_match("A", "https://a/1"));
        let (manager, _, store) = manager_with(vec![Arc::clone(&provider) as Arc<dyn Provider>]);

        manager
            .observe(PlayerObservation::playing(beatles()))
            .unwrap()
            .settled()
            .await;
        assert!(manager.observe(PlayerObservation::playing(beatles())).is_none());

        let mut other_album = beatles();
        other_album.album = "1".to_string();
        assert!(manager.observe(PlayerObservation::paused(other_album)).is_none());
        assert!(!store.snapshot().is_playing);
        assert_eq!(provider.exact_calls.load(Ordering::SeqCst), 1);

        let next = TrackSnapshot::new("Help!", "The Beatles", "Help!");
        manager
            .observe(PlayerObservation::playing(next))
            .unwrap()
            .settled()
            .await;
        assert_eq!(provider.exact_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.current_round(), 2);
    }

    #[tokio::test]
    async fn test_stop_then_same_track_starts_new_round() {
        let (manager, _, store) =
            manager_with(vec![MockProvider::exact_match("A", "https://a/1").into_arc()]);

        manager
            .observe(PlayerObservation::playing(beatles()))
            .unwrap()
            .settled()
            .await;
        assert!(manager.observe(PlayerObservation::stopped()).is_none());
        assert!(manager.refresh().is_none());
        assert!(store.snapshot().now_playing.is_none());

        assert!(manager.observe(PlayerObservation::playing(beatles())).is_some());
    }

    #[tokio::test]
    async fn test_superseded_round_results_are_discarded() {
        let echo = EchoProvider {
            id: ProviderId::new("Echo"),
            delays: HashMap::from([("Slow".to_string(), Duration::from_millis(300))]),
        };
        let (manager, _, store) = manager_with(vec![Arc::new(echo)]);

        let round_a = manager
            .observe(PlayerObservation::playing(TrackSnapshot::new("Slow", "X", "")))
            .unwrap();
        let round_b = manager
            .observe(PlayerObservation::playing(TrackSnapshot::new("Fast", "X", "")))
            .unwrap();
        assert!(round_b.round > round_a.round);

        round_b.settled().await;
        let snap = store.snapshot();
        assert!(!snap.searching);
        assert_eq!(snap.results[&ProviderId::new("Echo")].title, "Fast");

        // The slow round finishing late must change nothing
        round_a.settled().await;
        let snap = store.snapshot();
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.results[&ProviderId::new("Echo")].title, "Fast");
        assert_eq!(snap.searched.unwrap().title, "Fast");
        assert!(!snap.searching);
    }

    #[tokio::test]
    async fn test_partial_results_visible_while_collecting() {
        let (manager, _, store) = manager_with(vec![
            MockProvider::exact_match("Fast", "https://f/1").into_arc(),
            MockProvider::exact_match("Slow", "https://s/1")
                .with_delay(Duration::from_millis(300))
                .into_arc(),
        ]);
        let handle = manager.search(beatles());
        let partial = wait_for(&store, |s| s.has_results()).await;

        assert!(partial.searching);
        assert_eq!(partial.results.len(), 1);
        assert!(partial.results.contains_key(&ProviderId::new("Fast")));

        handle.settled().await;
        assert_eq!(store.snapshot().results.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_providers_run_concurrently() {
        let (manager, _, store) = manager_with(vec![
            MockProvider::exact_match("A", "https://a/1")
                .with_delay(Duration::from_millis(300))
                .into_arc(),
            MockProvider::exact_match("B", "https://b/1")
                .with_delay(Duration::from_millis(300))
                .into_arc(),
        ]);

        let started = Instant::now();
        manager.search(beatles()).settled().await;

        assert!(started.elapsed() < Duration::from_millis(550));
        assert_eq!(store.snapshot().results.len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_provider_is_isolated() {
        let (manager, _, store) = manager_with(vec![
            MockProvider::exact_match("Panics", "https://p/1").panicking().into_arc(),
            MockProvider::exact_match("Fine", "https://f/1").into_arc(),
        ]);

        manager.search(beatles()).settled().await;

        let snap = store.snapshot();
        assert!(!snap.searching);
        assert_eq!(snap.results.len(), 1);
        assert!(snap.results.contains_key(&ProviderId::new("Fine")));
    }

    #[test]
    fn test_duplicate_provider_ids_rejected() {
        let result = MatchingManager::new(
            vec![
                MockProvider::new("Same").into_arc(),
                MockProvider::new("Same").into_arc(),
            ],
            Arc::new(SettingsPolicy::default()),
            Arc::new(ResultStore::new()),
        );
        assert!(matches!(result, Err(Error::DuplicateProvider(name)) if name == "Same"));
    }

    #[tokio::test]
    async fn test_search_provider_prefers_exact() {
        let provider = MockProvider {
            fallback: crate::matching::traits::mocks::Scripted::Found(match_for("A", "https://a/fb")),
            ..MockProvider::exact_match("A", "https://a/exact")
        };
        let found = search_provider(&provider, &beatles()).await.unwrap().unwrap();
        assert_eq!(found.share_url, "https://a/exact");
        assert_eq!(provider.fallback_calls.load(Ordering::SeqCst), 0);
    }
}
