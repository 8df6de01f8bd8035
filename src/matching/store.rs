//! Published read model for the UI: current results, searching flag, last error.
//!
//! # Design
//!
//! - **Single lock**: every mutation takes one write lock, so a reader sees
//!   either the state before or after a mutation, never half of it.
//! - **Round gate**: writes carry the round id they belong to and are
//!   rejected unless it is still the current round. A slow provider from a
//!   superseded round can therefore never leak into a newer track's results.
//! - **Change notifications**: a `watch` channel carries a version counter
//!   bumped after every accepted mutation; readers call [`ResultStore::snapshot`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;

use super::domain::{ProviderId, SearchMatch, TrackSnapshot};

/// Monotonically increasing round counter. 0 means "no round yet".
pub type RoundId = u64;

/// Point-in-time copy of the store.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Round the results below belong to
    pub round: RoundId,
    /// Track the player currently reports (None = nothing loaded)
    pub now_playing: Option<TrackSnapshot>,
    pub is_playing: bool,
    /// Track the current round searched for
    pub searched: Option<TrackSnapshot>,
    /// Providers dispatched in the current round
    pub dispatched: Vec<ProviderId>,
    /// One entry per provider that matched in the current round
    pub results: BTreeMap<ProviderId, SearchMatch>,
    pub searching: bool,
    /// Global condition for the round (e.g. no eligible providers)
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// True once the current round has settled.
    pub fn is_settled(&self) -> bool {
        self.round > 0 && !self.searching
    }
}

/// Single-writer, multi-reader result store.
pub struct ResultStore {
    state: RwLock<StoreSnapshot>,
    version: watch::Sender<u64>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreSnapshot::default()),
            version,
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().clone()
    }

    /// Receiver that wakes on every accepted change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn current_round(&self) -> RoundId {
        self.state.read().round
    }

    /// Record what the player reports. Does not touch round state.
    pub fn set_playback(&self, track: Option<TrackSnapshot>, is_playing: bool) {
        {
            let mut state = self.state.write();
            if state.now_playing == track && state.is_playing == is_playing {
                return;
            }
            state.now_playing = track;
            state.is_playing = is_playing;
            state.updated_at = Some(Utc::now());
        }
        self.notify();
    }

    /// Start a new round: clear results and error, raise the searching flag.
    pub fn begin_round(&self, track: TrackSnapshot, dispatched: Vec<ProviderId>) -> RoundId {
        let round = {
            let mut state = self.state.write();
            state.round += 1;
            state.searched = Some(track);
            state.dispatched = dispatched;
            state.results.clear();
            state.error = None;
            state.searching = true;
            state.updated_at = Some(Utc::now());
            state.round
        };
        self.notify();
        round
    }

    /// Insert a provider's match if `round` is still current. Returns whether it was accepted.
    pub fn publish(&self, round: RoundId, provider: ProviderId, found: SearchMatch) -> bool {
        {
            let mut state = self.state.write();
            if state.round != round {
                return false;
            }
            state.results.insert(provider, found);
            state.updated_at = Some(Utc::now());
        }
        self.notify();
        true
    }

    /// Mark `round` settled. Ignored for superseded rounds.
    pub fn finish_round(&self, round: RoundId) -> bool {
        self.settle(round, None)
    }

    /// Mark `round` settled with a global error message. Ignored for superseded rounds.
    pub fn fail_round(&self, round: RoundId, message: impl Into<String>) -> bool {
        self.settle(round, Some(message.into()))
    }

    fn settle(&self, round: RoundId, error: Option<String>) -> bool {
        {
            let mut state = self.state.write();
            if state.round != round {
                return false;
            }
            state.searching = false;
            if error.is_some() {
                state.error = error;
            }
            state.updated_at = Some(Utc::now());
        }
        self.notify();
        true
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
