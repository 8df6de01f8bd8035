//! Application-wide error types.
//!
//! Subsystems define their own `thiserror` enums ([`ProviderError`],
//! [`NowPlayingError`], [`SecretError`], [`ConfigError`]); this module
//! aggregates them. The CLI and `main` use `anyhow` on top.
//!
//! # Example
//!
//! ```ignore
//! use tracklink::error::{Result, ResultExt};
//!
//! fn persist(config: &Config) -> Result<()> {
//!     config::save(config).map_err(Error::from).with_context("while disabling provider")
//! }
//! ```

use crate::config::ConfigError;
use crate::matching::ProviderError;
use crate::nowplaying::NowPlayingError;
use crate::secrets::SecretError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Secret storage error
    #[error("Secret store error: {0}")]
    Secret(#[from] SecretError),

    /// Player bridge error
    #[error("Now-playing error: {0}")]
    NowPlaying(#[from] NowPlayingError),

    /// Catalog provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Two providers registered under one name
    #[error("Duplicate provider name: {0}")]
    DuplicateProvider(String),

    /// No provider with this name or slug
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an unknown-provider error.
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider(name.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, SecretError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Secret(e).context(ctx))
    }
}
