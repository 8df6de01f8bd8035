//! Player bridge that shells out to a platform tool.
//!
//! - macOS: `osascript` asking the Music app
//! - elsewhere: `playerctl` (MPRIS)
//!
//! Both print the same line format, parsed by [`parse_output`]:
//!
//! ```text
//! playing|paused|stopped
//! <title>
//! <artist>
//! <album>
//! <player track id>   (optional)
//! ```

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{DEFAULT_POLL_TIMEOUT, NowPlayingError, NowPlayingSource};
use crate::config::PollingConfig;
use crate::matching::{PlayerObservation, TrackSnapshot};

#[cfg(target_os = "macos")]
const MUSIC_APP_SCRIPT: &str = r#"
if application "Music" is not running then return "stopped"
tell application "Music"
    set playerState to player state as string
    if playerState is "stopped" then return "stopped"
    set t to current track
    return playerState & linefeed & (name of t) & linefeed & (artist of t) & linefeed & (album of t) & linefeed & (persistent ID of t)
end tell
"#;

#[cfg(not(target_os = "macos"))]
const PLAYERCTL_FORMAT: &str =
    "{{lc(status)}}\n{{title}}\n{{artist}}\n{{album}}\n{{mpris:trackid}}";

/// playerctl's complaint when no MPRIS player is running
const NO_PLAYERS: &str = "No players found";

/// How often a running bridge is checked for exit
const EXIT_CHECK_INTERVAL: Duration = Duration::from_millis(20);

/// Runs a command and parses its stdout.
///
/// A command still running after `timeout` is killed.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The bridge for this platform.
    #[cfg(target_os = "macos")]
    pub fn platform_default() -> Self {
        Self::new("osascript", vec!["-e".to_string(), MUSIC_APP_SCRIPT.to_string()])
    }

    /// The bridge for this platform.
    #[cfg(not(target_os = "macos"))]
    pub fn platform_default() -> Self {
        Self::new(
            "playerctl",
            vec![
                "metadata".to_string(),
                "--format".to_string(),
                PLAYERCTL_FORMAT.to_string(),
            ],
        )
    }

    /// Configured override, else the platform default.
    pub fn from_config(polling: &PollingConfig) -> Self {
        let source = match &polling.command {
            Some(program) if !program.trim().is_empty() => {
                Self::new(program.clone(), polling.args.clone())
            }
            _ => Self::platform_default(),
        };
        source.with_timeout(polling.timeout())
    }

    fn spawn_error(&self, source: std::io::Error) -> NowPlayingError {
        NowPlayingError::Spawn {
            command: self.program.clone(),
            source,
        }
    }

    /// Run the command to completion, killing it at the deadline.
    fn run(&self) -> Result<std::process::Output, NowPlayingError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if child.try_wait().map_err(|e| self.spawn_error(e))?.is_some() {
                return child.wait_with_output().map_err(|e| self.spawn_error(e));
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    tracing::debug!(command = %self.program, error = %e, "Failed to kill bridge");
                }
                let _ = child.wait();
                return Err(NowPlayingError::Timeout {
                    command: self.program.clone(),
                    after: self.timeout,
                });
            }
            thread::sleep(EXIT_CHECK_INTERVAL);
        }
    }
}

impl NowPlayingSource for CommandSource {
    fn poll(&self) -> Result<PlayerObservation, NowPlayingError> {
        let output = self.run()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains(NO_PLAYERS) {
                return Ok(PlayerObservation::stopped());
            }
            return Err(NowPlayingError::CommandFailed {
                command: self.program.clone(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn describe(&self) -> String {
        self.program.clone()
    }
}

/// Parse bridge output into an observation.
///
/// Empty output, `stopped`, or a state line with no title all mean "no track".
pub fn parse_output(stdout: &str) -> Result<PlayerObservation, NowPlayingError> {
    let mut lines = stdout.lines().map(|l| l.trim_end_matches('\r'));

    let state = lines.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_playing = match state.as_str() {
        "" | "stopped" => return Ok(PlayerObservation::stopped()),
        "playing" | "fast forwarding" | "rewinding" => true,
        "paused" => false,
        other => return Err(NowPlayingError::Parse(format!("unknown player state '{other}'"))),
    };

    let mut field = || lines.next().map(|l| l.trim().to_string()).unwrap_or_default();
    let title = field();
    let artist = field();
    let album = field();
    let source_id = Some(field()).filter(|id| !id.is_empty());

    if title.is_empty() {
        return Ok(PlayerObservation {
            track: None,
            is_playing,
        });
    }

    let track = TrackSnapshot {
        source_id,
        ..TrackSnapshot::new(title, artist, album)
    };
    Ok(PlayerObservation {
        track: Some(track),
        is_playing,
    })
}
