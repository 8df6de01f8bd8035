//! Local player observation.
//!
//! A [`NowPlayingSource`] answers "what is the player doing right now?".
//! The [`poller`] asks it periodically and feeds each answer to the
//! matching manager. Sources are blocking; the poller runs them on the
//! blocking thread pool.

pub mod command;
pub mod poller;

pub use command::{CommandSource, parse_output};
pub use poller::Poller;

use std::time::Duration;

use crate::matching::PlayerObservation;

/// Longest a single poll may take before it counts as failed.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors reading player state.
#[derive(Debug, thiserror::Error)]
pub enum NowPlayingError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Unrecognized player output: {0}")]
    Parse(String),

    #[error("{command} gave no answer within {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("Player poll task failed: {0}")]
    Task(String),
}

/// Something that can report the local player's current track.
pub trait NowPlayingSource: Send + Sync {
    /// Blocking poll. `Ok` with no track means nothing is loaded.
    fn poll(&self) -> Result<PlayerObservation, NowPlayingError>;

    /// Human-readable description for logs and the CLI.
    fn describe(&self) -> String;
}
