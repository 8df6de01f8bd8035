//! Builds the shared HTTP client and the registered provider list.

use std::sync::Arc;

use super::domain::ProviderId;
use super::spotify::SpotifyProvider;
use super::traits::Provider;
use super::youtube::YouTubeMusicProvider;
use crate::config::{Config, HttpConfig};
use crate::error::{Error, Result};
use crate::secrets::SecretStore;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One client shared by every provider, so connections are pooled.
pub fn build_http_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .timeout(http.timeout())
        .connect_timeout(http.connect_timeout())
        .build()?;
    Ok(client)
}

/// Every built-in provider, in display order.
pub fn build_providers(
    config: &Config,
    secrets: Arc<dyn SecretStore>,
    http_client: reqwest::Client,
) -> Vec<Arc<dyn Provider>> {
    vec![
        Arc::new(SpotifyProvider::new(
            http_client.clone(),
            Arc::clone(&secrets),
            &config.matching,
        )),
        Arc::new(YouTubeMusicProvider::new(
            http_client,
            secrets,
            &config.matching,
        )),
    ]
}

/// Find a provider by display name or slug (`youtube_music`, `"YouTube Music"`).
pub fn find_provider<'a>(
    providers: &'a [Arc<dyn Provider>],
    name: &str,
) -> Result<&'a Arc<dyn Provider>> {
    let wanted = ProviderId::new(name).slug();
    providers
        .iter()
        .find(|p| p.id().slug() == wanted)
        .ok_or_else(|| Error::unknown_provider(name))
}
