//! User-visible status derived from a [`StoreSnapshot`].
//!
//! Pure functions only; the watch command re-derives and re-renders on
//! every store change.

use std::fmt;

use crate::matching::{StoreSnapshot, TrackSnapshot};

/// What the player is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerLine {
    NoMusic,
    Playing(TrackSnapshot),
    Paused(TrackSnapshot),
}

/// Where the current round is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchLine {
    /// No round has run for the current track
    Idle,
    Searching,
    Results { still_searching: bool },
    NoMatches,
    Error(String),
}

/// One provider's match, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub provider: String,
    pub title: String,
    pub artist: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStatus {
    pub player: PlayerLine,
    pub matches: MatchLine,
    pub rows: Vec<ResultRow>,
}

impl DisplayStatus {
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let player = match &snapshot.now_playing {
            None => PlayerLine::NoMusic,
            Some(track) if snapshot.is_playing => PlayerLine::Playing(track.clone()),
            Some(track) => PlayerLine::Paused(track.clone()),
        };

        if player == PlayerLine::NoMusic {
            return Self {
                player,
                matches: MatchLine::Idle,
                rows: Vec::new(),
            };
        }

        Self {
            player,
            matches: match_line(snapshot),
            rows: result_rows(snapshot),
        }
    }
}

fn match_line(snapshot: &StoreSnapshot) -> MatchLine {
    if let Some(error) = &snapshot.error {
        return MatchLine::Error(error.clone());
    }
    match (snapshot.round, snapshot.searching, snapshot.has_results()) {
        (0, _, _) => MatchLine::Idle,
        (_, searching, true) => MatchLine::Results {
            still_searching: searching,
        },
        (_, true, false) => MatchLine::Searching,
        (_, false, false) => MatchLine::NoMatches,
    }
}

/// Rows in dispatch order, so providers keep a stable position as results arrive.
fn result_rows(snapshot: &StoreSnapshot) -> Vec<ResultRow> {
    let dispatched = snapshot
        .dispatched
        .iter()
        .filter_map(|id| snapshot.results.get(id));
    let stragglers = snapshot
        .results
        .iter()
        .filter(|(id, _)| !snapshot.dispatched.contains(*id))
        .map(|(_, found)| found);

    dispatched
        .chain(stragglers)
        .map(|found| ResultRow {
            provider: found.provider.to_string(),
            title: found.title.clone(),
            artist: found.artist.clone(),
            url: found.preferred_url().to_string(),
        })
        .collect()
}

impl fmt::Display for PlayerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerLine::NoMusic => write!(f, "No music playing"),
            PlayerLine::Playing(track) => write!(f, "Now playing: {track}"),
            PlayerLine::Paused(track) => write!(f, "Music paused: {track}"),
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.player)?;
        match &self.matches {
            MatchLine::Idle => {}
            MatchLine::Searching => writeln!(f, "  Searching...")?,
            MatchLine::NoMatches => writeln!(f, "  No matches found")?,
            MatchLine::Error(message) => writeln!(f, "  Error: {message}")?,
            MatchLine::Results { .. } => {}
        }
        for row in &self.rows {
            writeln!(f, "  {:<14} {} - {}", row.provider, row.artist, row.title)?;
            writeln!(f, "  {:<14} {}", "", row.url)?;
        }
        if let MatchLine::Results {
            still_searching: true,
        } = self.matches
        {
            writeln!(f, "  Searching...")?;
        }
        Ok(())
    }
}
