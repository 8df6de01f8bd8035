//! Heuristic re-ranking for catalogs with noisy, free-text metadata.
//!
//! Video catalogs describe tracks with informal display titles
//! ("Artist - Song (Official Video)") and uploader names instead of
//! structured fields. This module scores such candidates against the query
//! and cleans the chosen candidate's title/artist back into usable values.
//!
//! Everything here is pure: same query + same candidate list = same pick.

use serde::{Deserialize, Serialize};

/// Uploader names containing any of these count as an official source.
const OFFICIAL_CHANNEL_MARKERS: &[&str] = &["official", "music", "records"];

/// Display titles containing any of these are probably not the original recording.
const UNWANTED_MARKERS: &[&str] = &["cover", "remix", "karaoke"];

/// Marketing suffixes stripped from display titles (matched case-insensitively).
const TITLE_SUFFIXES: &[&str] = &[
    "(official music video)",
    "(official video)",
    "(official audio)",
    "(official lyric video)",
    "(official visualizer)",
    "(lyric video)",
    "(lyrics)",
    "(audio)",
    "(visualizer)",
    "(music video)",
    "[official music video]",
    "[official video]",
    "[official audio]",
    "[lyric video]",
    "[lyrics]",
    "[audio]",
    "(hd)",
    "[hd]",
];

/// Channel name decorations that are not part of the artist name.
const CHANNEL_SUFFIXES: &[&str] = &[" - topic", "vevo", " official"];

/// Weights for the linear candidate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Display title contains the query title
    pub title_match: i32,
    /// Display title contains the query artist
    pub artist_match: i32,
    /// Uploader looks like an official/label account
    pub official_channel: i32,
    /// Display title contains the word "official"
    pub official_title: i32,
    /// Subtracted when the title mentions cover/remix/karaoke
    pub unwanted_penalty: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_match: 10,
            artist_match: 10,
            official_channel: 5,
            official_title: 3,
            unwanted_penalty: 5,
        }
    }
}

/// A raw search hit from a noisy catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    /// Display title as the catalog shows it
    pub title: String,
    /// Uploader / channel name
    pub channel: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel: channel.into(),
        }
    }
}

/// Case-insensitive substring test. An empty needle never matches.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Score one candidate against the query.
pub fn score_candidate(
    candidate: &Candidate,
    title: &str,
    artist: &str,
    weights: &ScoringWeights,
) -> i32 {
    let display = candidate.title.to_lowercase();
    let channel = candidate.channel.to_lowercase();
    let mut score = 0;

    if contains_ci(&display, title) {
        score += weights.title_match;
    }
    if contains_ci(&display, artist) {
        score += weights.artist_match;
    }
    if OFFICIAL_CHANNEL_MARKERS.iter().any(|m| channel.contains(m)) {
        score += weights.official_channel;
    }
    if display.contains("official") {
        score += weights.official_title;
    }
    if UNWANTED_MARKERS.iter().any(|m| display.contains(m)) {
        score -= weights.unwanted_penalty;
    }

    score
}

/// Pick the highest-scoring candidate. Ties go to the earlier (higher-ranked) one.
///
/// Returns the candidate's index and score.
pub fn select_best(
    candidates: &[Candidate],
    title: &str,
    artist: &str,
    weights: &ScoringWeights,
) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = score_candidate(candidate, title, artist, weights);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// True when the display title mentions both the query title and artist.
pub fn mentions_title_and_artist(candidate: &Candidate, title: &str, artist: &str) -> bool {
    contains_ci(&candidate.title, title)
        && (artist.trim().is_empty()
            || contains_ci(&candidate.title, artist)
            || contains_ci(&candidate.channel, artist))
}

/// Strip marketing suffixes like "(Official Video)" from a display title.
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.trim();
    while let Some(stripped) = TITLE_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ci(title, suffix))
    {
        title = stripped.trim_end();
    }
    title.to_string()
}

/// `str::strip_suffix`, ignoring ASCII case.
fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(cut) || !text[cut..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&text[..cut])
}

/// Split an "Artist - Title" display string.
pub fn split_artist_title(display: &str) -> Option<(String, String)> {
    let (artist, title) = display
        .split_once(" - ")
        .or_else(|| display.split_once(" \u{2013} "))?;
    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist.to_string(), title.to_string()))
}

/// Remove " - Topic" / "VEVO" style decorations from an uploader name.
pub fn clean_channel(channel: &str) -> String {
    let mut name = channel.trim();
    for suffix in CHANNEL_SUFFIXES {
        if let Some(stripped) = strip_suffix_ci(name, suffix)
            && !stripped.trim().is_empty()
        {
            name = stripped.trim_end();
        }
    }
    name.to_string()
}

/// Keep a cleaned value only if it still contains the query; otherwise use the query verbatim.
pub fn prefer_query(cleaned: &str, query: &str) -> String {
    if query.trim().is_empty() || contains_ci(cleaned, query) {
        cleaned.to_string()
    } else {
        query.to_string()
    }
}

/// Title and artist resolved from a noisy candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub title: String,
    pub artist: String,
}

/// Derive clean title/artist for a candidate, falling back to the query values
/// whenever cleanup would lose the query's title or artist.
pub fn resolve_fields(candidate: &Candidate, title: &str, artist: &str) -> ResolvedFields {
    let cleaned = clean_title(&candidate.title);
    let (raw_artist, raw_title) = match split_artist_title(&cleaned) {
        Some((a, t)) => (a, clean_title(&t)),
        None => (clean_channel(&candidate.channel), cleaned),
    };

    ResolvedFields {
        title: prefer_query(&raw_title, title),
        artist: prefer_query(&raw_artist, artist),
    }
}

/// Decode the handful of HTML entities catalog APIs leave in snippet text.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
