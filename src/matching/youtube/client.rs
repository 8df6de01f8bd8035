//! YouTube Music provider (YouTube Data API v3)
//!
//! Key-based catalog whose results are videos with informal titles, so both
//! search tiers re-rank candidates with [`crate::matching::scoring`]:
//!
//! - Exact search queries artist + title + album and only accepts the
//!   best candidate when it mentions both the title and the artist.
//! - Fallback search queries title + artist and takes the best score outright.

use std::sync::Arc;

use async_trait::async_trait;

use super::{adapter, dto};
use crate::config::MatchingConfig;
use crate::matching::domain::{ProviderError, ProviderId, SearchMatch};
use crate::matching::scoring::{self, Candidate, ScoringWeights};
use crate::matching::traits::Provider;
use crate::secrets::{SecretStore, YOUTUBE_API_KEY};

/// Display name and aggregation key.
pub const YOUTUBE_MUSIC: &str = "YouTube Music";

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube "Music" video category
const MUSIC_CATEGORY_ID: &str = "10";

/// YouTube Music catalog provider
pub struct YouTubeMusicProvider {
    id: ProviderId,
    http_client: reqwest::Client,
    api_base: String,
    secrets: Arc<dyn SecretStore>,
    weights: ScoringWeights,
    max_results: u32,
}

impl YouTubeMusicProvider {
    /// Create a provider against the public Data API
    pub fn new(
        http_client: reqwest::Client,
        secrets: Arc<dyn SecretStore>,
        matching: &MatchingConfig,
    ) -> Self {
        Self::with_base_url(http_client, secrets, matching, API_BASE)
    }

    /// Create a provider with a custom API base URL
    pub fn with_base_url(
        http_client: reqwest::Client,
        secrets: Arc<dyn SecretStore>,
        matching: &MatchingConfig,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            id: ProviderId::new(YOUTUBE_MUSIC),
            http_client,
            api_base: api_base.into(),
            secrets,
            weights: matching.weights,
            max_results: matching.fallback_limit(),
        }
    }

    /// Run a video search and return scoring candidates in API rank order
    async fn search_videos(&self, query: &str) -> Result<Vec<Candidate>, ProviderError> {
        let api_key = self
            .secrets
            .get(YOUTUBE_API_KEY)
            .ok_or_else(|| ProviderError::NotConfigured(self.id.clone()))?;
        let max_results = self.max_results.to_string();

        let response = self
            .http_client
            .get(format!("{}/search", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::SearchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<dto::ApiErrorResponse>().await {
                Ok(error) => format!("HTTP {}: {}", error.error.code, error.error.message),
                Err(_) => format!(
                    "HTTP {}: {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            };
            // Invalid keys come back as 400 keyInvalid or 403 forbidden
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
                || detail.contains("API key")
            {
                return Err(ProviderError::AuthenticationFailed(detail));
            }
            return Err(ProviderError::SearchFailed(detail));
        }

        let body = response
            .json::<dto::SearchListResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(adapter::to_candidates(body))
    }
}

#[async_trait]
impl Provider for YouTubeMusicProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn is_configured(&self) -> bool {
        self.secrets.has(YOUTUBE_API_KEY)
    }

    async fn search_exact(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Option<SearchMatch>, ProviderError> {
        let candidates = self
            .search_videos(&adapter::query(&[artist, title, album]))
            .await?;

        let Some((index, score)) = scoring::select_best(&candidates, title, artist, &self.weights)
        else {
            return Ok(None);
        };
        let best = &candidates[index];
        if !scoring::mentions_title_and_artist(best, title, artist) {
            tracing::debug!(provider = %self.id, candidate = %best.title, score, "Best exact candidate too weak");
            return Ok(None);
        }

        Ok(Some(adapter::to_match(best, title, artist, album, &self.id)))
    }

    async fn search_fallback(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<SearchMatch>, ProviderError> {
        let candidates = self.search_videos(&adapter::query(&[title, artist])).await?;

        Ok(
            scoring::select_best(&candidates, title, artist, &self.weights).map(|(index, score)| {
                tracing::debug!(provider = %self.id, candidate = %candidates[index].title, score, "Fallback pick");
                adapter::to_match(&candidates[index], title, artist, "", &self.id)
            }),
        )
    }
}
