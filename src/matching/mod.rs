//! Now-playing track matching across music catalogs.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - track snapshots, provider ids, matches
//! - **Provider trait** (`traits.rs`) - the search capability every catalog implements
//! - **API DTOs** (`spotify/dto.rs`, `youtube/dto.rs`) - exact API response shapes
//! - **Adapters** - convert DTOs to domain models
//! - **Clients** - HTTP clients for each catalog
//! - **Scoring** (`scoring.rs`) - re-ranking for catalogs with noisy metadata
//! - **Policy / Store / Manager** - eligibility, the published result set, and
//!   the round orchestration tying them together
//!
//! # Usage
//!
//! ```ignore
//! let http = registry::build_http_client(&config.http)?;
//! let providers = registry::build_providers(&config, secrets, http);
//! let manager = MatchingManager::new(providers, policy, Arc::new(ResultStore::new()))?;
//!
//! manager.observe(PlayerObservation::playing(track));
//! let snapshot = manager.store().snapshot();
//! ```

pub mod domain;
pub mod manager;
pub mod policy;
pub mod registry;
pub mod scoring;
pub mod spotify;
pub mod store;
pub mod traits;
pub mod youtube;

pub use domain::{PlayerObservation, ProviderError, ProviderId, SearchMatch, TrackSnapshot};
pub use manager::{MatchingManager, RoundHandle};
pub use policy::{EnablementPolicy, PersistedPolicy, SettingsPolicy};
pub use spotify::{SPOTIFY, SpotifyProvider};
pub use store::{ResultStore, RoundId, StoreSnapshot};
pub use traits::Provider;
pub use youtube::{YOUTUBE_MUSIC, YouTubeMusicProvider};
