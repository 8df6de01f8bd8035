//! The provider capability every catalog integration implements.
//!
//! The manager only ever talks to `dyn Provider`, which keeps the concrete
//! catalogs swappable and lets tests substitute scripted providers.
//!
//! # Example
//!
//! ```ignore
//! use tracklink::matching::traits::Provider;
//!
//! async fn best<P: Provider + ?Sized>(p: &P, t: &TrackSnapshot) -> Option<SearchMatch> {
//!     match p.search_exact(&t.title, &t.artist, &t.album).await.ok()? {
//!         Some(m) => Some(m),
//!         None => p.search_fallback(&t.title, &t.artist).await.ok()?,
//!     }
//! }
//! ```

use async_trait::async_trait;

use super::domain::{ProviderError, ProviderId, SearchMatch};

/// Search-by-metadata against one external music catalog.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable name, unique across registered providers.
    fn id(&self) -> &ProviderId;

    /// True when every credential this provider needs is present. Never touches the network.
    fn is_configured(&self) -> bool;

    /// Lookup constrained by title, artist and album.
    ///
    /// `Ok(None)` means "no strong enough match", which is a normal outcome.
    async fn search_exact(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Option<SearchMatch>, ProviderError>;

    /// Looser title + artist lookup with heuristic re-ranking, used after an empty exact search.
    async fn search_fallback(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<SearchMatch>, ProviderError>;
}
