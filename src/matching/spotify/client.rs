//! Spotify Web API provider
//!
//! Token-based catalog: every search needs a bearer token from the
//! client-credentials flow (see [`super::auth`]).
//!
//! - Exact search uses field filters (`track:`, `artist:`, `album:`) and takes the top hit.
//! - Fallback search is free text over title + artist, limited to a few
//!   candidates, and keeps the first one credited to the query artist.

use std::sync::Arc;

use async_trait::async_trait;

use super::{adapter, auth::TokenAuth, dto};
use crate::config::MatchingConfig;
use crate::matching::domain::{ProviderError, ProviderId, SearchMatch};
use crate::matching::traits::Provider;
use crate::secrets::{SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET, SecretStore};

/// Display name and aggregation key.
pub const SPOTIFY: &str = "Spotify";

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify catalog provider
pub struct SpotifyProvider {
    id: ProviderId,
    http_client: reqwest::Client,
    api_base: String,
    secrets: Arc<dyn SecretStore>,
    auth: TokenAuth,
    fallback_limit: u32,
}

impl SpotifyProvider {
    /// Create a provider against the public Spotify endpoints
    pub fn new(
        http_client: reqwest::Client,
        secrets: Arc<dyn SecretStore>,
        matching: &MatchingConfig,
    ) -> Self {
        Self::with_endpoints(http_client, secrets, matching, TOKEN_URL, API_BASE)
    }

    /// Create a provider with custom token/API endpoints
    pub fn with_endpoints(
        http_client: reqwest::Client,
        secrets: Arc<dyn SecretStore>,
        matching: &MatchingConfig,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let id = ProviderId::new(SPOTIFY);
        let auth = TokenAuth::new(
            id.clone(),
            http_client.clone(),
            token_url,
            Arc::clone(&secrets),
            matching.token_expiry_buffer(),
        );
        Self {
            id,
            http_client,
            api_base: api_base.into(),
            secrets,
            auth,
            fallback_limit: matching.fallback_limit(),
        }
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(self.id.clone()))
        }
    }

    /// Run a track search and return the ranked items
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<dto::Track>, ProviderError> {
        self.ensure_configured()?;
        let bearer = self.auth.bearer().await?;
        let limit = limit.to_string();

        let response = self
            .http_client
            .get(format!("{}/search", self.api_base))
            .bearer_auth(bearer)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::SearchFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked or expired early; the next search exchanges a new one
            self.auth.invalidate().await;
            return Err(ProviderError::AuthenticationFailed(
                "access token rejected".to_string(),
            ));
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ApiErrorResponse>().await {
                return Err(ProviderError::SearchFailed(format!(
                    "HTTP {}: {}",
                    error.error.status, error.error.message
                )));
            }
            return Err(ProviderError::SearchFailed(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .json::<dto::SearchResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body.tracks.map(|page| page.items).unwrap_or_default())
    }
}

#[async_trait]
impl Provider for SpotifyProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn is_configured(&self) -> bool {
        self.secrets.has(SPOTIFY_CLIENT_ID) && self.secrets.has(SPOTIFY_CLIENT_SECRET)
    }

    async fn search_exact(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Option<SearchMatch>, ProviderError> {
        let query = adapter::exact_query(title, artist, album);
        let items = self.search_tracks(&query, 1).await?;
        Ok(items.into_iter().next().map(|t| adapter::to_match(t, &self.id)))
    }

    async fn search_fallback(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<SearchMatch>, ProviderError> {
        let query = adapter::fallback_query(title, artist);
        let items = self.search_tracks(&query, self.fallback_limit).await?;
        Ok(adapter::pick_by_artist(items, artist).map(|t| adapter::to_match(t, &self.id)))
    }
}
