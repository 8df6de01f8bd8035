//! Client-credentials token exchange with an in-memory cache.
//!
//! The cached token is reused until `now + buffer` reaches its expiry. The
//! mutex is held across the exchange so concurrent searches share one
//! renewal instead of racing to the token endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::dto;
use crate::matching::domain::{ProviderError, ProviderId};
use crate::secrets::{SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET, SecretStore};

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant, buffer: Duration) -> bool {
        now.checked_add(buffer)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

/// Bearer-token source for the Spotify Web API.
pub struct TokenAuth {
    provider: ProviderId,
    http_client: reqwest::Client,
    token_url: String,
    secrets: Arc<dyn SecretStore>,
    expiry_buffer: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenAuth {
    pub fn new(
        provider: ProviderId,
        http_client: reqwest::Client,
        token_url: impl Into<String>,
        secrets: Arc<dyn SecretStore>,
        expiry_buffer: Duration,
    ) -> Self {
        Self {
            provider,
            http_client,
            token_url: token_url.into(),
            secrets,
            expiry_buffer,
            cached: Mutex::new(None),
        }
    }

    /// A valid access token, exchanging credentials when the cache is empty or near expiry.
    pub async fn bearer(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.is_fresh(Instant::now(), self.expiry_buffer)
        {
            return Ok(token.access_token.clone());
        }

        let token = self.exchange().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token (e.g. after the API rejected it).
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn exchange(&self) -> Result<CachedToken, ProviderError> {
        let (Some(client_id), Some(client_secret)) = (
            self.secrets.get(SPOTIFY_CLIENT_ID),
            self.secrets.get(SPOTIFY_CLIENT_SECRET),
        ) else {
            return Err(ProviderError::NotConfigured(self.provider.clone()));
        };

        tracing::debug!(provider = %self.provider, "Requesting access token");

        let requested_at = Instant::now();
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ProviderError::AuthenticationFailed(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let expires_at = requested_at
            .checked_add(Duration::from_secs(token.expires_in))
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!("expires_in out of range: {}", token.expires_in))
            })?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secrets() -> Arc<dyn SecretStore> {
        Arc::new(
            MemorySecretStore::new()
                .with(SPOTIFY_CLIENT_ID, "id")
                .with(SPOTIFY_CLIENT_SECRET, "secret"),
        )
    }

    fn auth_for(server: &MockServer, secrets: Arc<dyn SecretStore>) -> TokenAuth {
        TokenAuth::new(
            ProviderId::new("Spotify"),
            reqwest::Client::new(),
            format!("{}/api/token", server.uri()),
            secrets,
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_token_freshness_respects_buffer() {
        let now = Instant::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::from_secs(90),
        };
        assert!(token.is_fresh(now, Duration::from_secs(60)));
        assert!(!token.is_fresh(now + Duration::from_secs(30), Duration::from_secs(60)));
        assert!(!token.is_fresh(now + Duration::from_secs(120), Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_token_reused_within_validity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            // base64("id:secret")
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = auth_for(&server, secrets());
        assert_eq!(auth.bearer().await.unwrap(), "tok-1");
        assert_eq!(auth.bearer().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = auth_for(&server, secrets());
        auth.bearer().await.unwrap();
        auth.invalidate().await;
        auth.bearer().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "Invalid client secret"
            })))
            .mount(&server)
            .await;

        let auth = auth_for(&server, secrets());
        let result = auth.bearer().await;
        assert!(matches!(result, Err(ProviderError::AuthenticationFailed(msg)) if msg.contains("400")));
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let auth = auth_for(&server, Arc::new(MemorySecretStore::new()));
        assert!(matches!(
            auth.bearer().await,
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_token_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let auth = auth_for(&server, secrets());
        assert!(matches!(
            auth.bearer().await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"access_token":"tok","token_type":"Bearer","expires_in":{}}}"#,
                u64::MAX
            )))
            .mount(&server)
            .await;

        let auth = auth_for(&server, secrets());
        assert!(matches!(
            auth.bearer().await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
