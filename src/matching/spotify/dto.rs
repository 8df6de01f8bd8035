//! Spotify Web API Data Transfer Objects
//!
//! These types match what the token and search endpoints return.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api/reference/search
//!
//! Example search response (trimmed):
//! ```json
//! {
//!   "tracks": {
//!     "items": [{
//!       "id": "3BQHpFgAp4l80e1XslIjNI",
//!       "name": "Yesterday - Remastered 2009",
//!       "uri": "spotify:track:3BQHpFgAp4l80e1XslIjNI",
//!       "artists": [{"name": "The Beatles"}],
//!       "album": {"name": "Help! (Remastered)"},
//!       "external_urls": {"spotify": "https://open.spotify.com/track/3BQHpFgAp4l80e1XslIjNI"}
//!     }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Top-level search response (`type=track`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// `spotify:track:<id>`
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Error body returned by the API endpoints (`{"error": {"status": 401, "message": ...}}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
