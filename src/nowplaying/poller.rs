//! Periodic player polling.
//!
//! The poller is the only task that feeds observations to the manager, so
//! the manager's notion of "current track" has a single writer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use super::{DEFAULT_POLL_TIMEOUT, NowPlayingError, NowPlayingSource};
use crate::matching::{MatchingManager, PlayerObservation, RoundHandle};

/// Run one blocking poll on the blocking thread pool, giving up after `timeout`.
pub async fn poll_once(
    source: Arc<dyn NowPlayingSource>,
    timeout: Duration,
) -> Result<PlayerObservation, NowPlayingError> {
    let command = source.describe();
    let task = tokio::task::spawn_blocking(move || source.poll());
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined.map_err(|e| NowPlayingError::Task(e.to_string()))?,
        Err(_) => Err(NowPlayingError::Timeout {
            command,
            after: timeout,
        }),
    }
}

/// Polls a source and hands every observation to the manager.
pub struct Poller {
    source: Arc<dyn NowPlayingSource>,
    manager: Arc<MatchingManager>,
    interval: Duration,
    timeout: Duration,
    /// Last reported failure, to log repeats quietly
    last_error: Option<String>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn NowPlayingSource>,
        manager: Arc<MatchingManager>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            manager,
            interval,
            timeout: DEFAULT_POLL_TIMEOUT,
            last_error: None,
        }
    }

    /// Longest a single poll may block the loop.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One poll. Returns the round it started, if the track changed.
    ///
    /// A failed poll keeps the last known state.
    pub async fn tick(&mut self) -> Option<RoundHandle> {
        match poll_once(Arc::clone(&self.source), self.timeout).await {
            Ok(observation) => {
                if self.last_error.take().is_some() {
                    debug!(source = %self.source.describe(), "Player poll recovered");
                }
                self.manager.observe(observation)
            }
            Err(e) => {
                let message = e.to_string();
                if self.last_error.as_deref() == Some(message.as_str()) {
                    debug!(error = %message, "Player poll still failing");
                } else {
                    warn!(source = %self.source.describe(), error = %message, "Player poll failed");
                    self.last_error = Some(message);
                }
                None
            }
        }
    }

    /// Poll forever at the configured interval.
    pub async fn run(mut self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(source = %self.source.describe(), interval_ms = self.interval.as_millis() as u64, "Poller started");
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
