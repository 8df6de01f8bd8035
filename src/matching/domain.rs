//! Internal domain models for cross-catalog track matching.
//!
//! These types are OUR types - they don't change when external APIs change.
//! Every provider converts its API responses into these via its adapter.

use std::fmt;

use serde::Serialize;

/// A "now playing" track as reported by the local player.
///
/// Compared by value; two snapshots are the same track when title and
/// artist match (see [`TrackSnapshot::same_track`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackSnapshot {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Player-native identifier (persistent id, MPRIS track id, ...)
    pub source_id: Option<String>,
}

impl TrackSnapshot {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            source_id: None,
        }
    }

    /// True when both snapshots describe the same track (title + artist).
    pub fn same_track(&self, other: &TrackSnapshot) -> bool {
        self.title == other.title && self.artist == other.artist
    }

    /// A track needs at least a title to be searchable.
    pub fn is_searchable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl fmt::Display for TrackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.artist, self.title)
        }
    }
}

/// One poll of the local player: the current track (if any) and whether it is playing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerObservation {
    pub track: Option<TrackSnapshot>,
    pub is_playing: bool,
}

impl PlayerObservation {
    pub fn playing(track: TrackSnapshot) -> Self {
        Self {
            track: Some(track),
            is_playing: true,
        }
    }

    pub fn paused(track: TrackSnapshot) -> Self {
        Self {
            track: Some(track),
            is_playing: false,
        }
    }

    pub fn stopped() -> Self {
        Self::default()
    }
}

/// Stable provider name, used both as display label and aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Config-friendly key: lowercase, spaces become underscores ("YouTube Music" -> "youtube_music").
    pub fn slug(&self) -> String {
        self.0
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Best match a provider found for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub provider: ProviderId,
    /// Provider-native track id (Spotify track id, YouTube video id)
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Universally shareable link
    pub share_url: String,
    /// Opens the track in the provider's web player
    pub web_url: Option<String>,
    /// Opens the track in the provider's desktop app
    pub app_url: Option<String>,
}

impl SearchMatch {
    /// Link the UI should open: native app, then web player, then share link.
    pub fn preferred_url(&self) -> &str {
        self.app_url
            .as_deref()
            .or(self.web_url.as_deref())
            .unwrap_or(&self.share_url)
    }
}

/// Errors a provider can surface. "No results" is not one of them - that is `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} is not configured (missing credentials)")]
    NotConfigured(ProviderId),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Search request failed: {0}")]
    SearchFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
