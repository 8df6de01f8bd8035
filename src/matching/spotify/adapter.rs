//! Adapter layer: Convert Spotify DTOs to domain models

use super::dto;
use crate::matching::domain::{ProviderId, SearchMatch};

const WEB_PLAYER_BASE: &str = "https://open.spotify.com/track";

/// Convert a search hit into a match.
pub fn to_match(track: dto::Track, provider: &ProviderId) -> SearchMatch {
    let web_url = format!("{}/{}", WEB_PLAYER_BASE, track.id);
    let share_url = track
        .external_urls
        .spotify
        .clone()
        .unwrap_or_else(|| web_url.clone());
    let app_url = track
        .uri
        .clone()
        .unwrap_or_else(|| format!("spotify:track:{}", track.id));

    let artist = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    SearchMatch {
        provider: provider.clone(),
        track_id: track.id,
        title: track.name,
        artist,
        album: track.album.map(|a| a.name).unwrap_or_default(),
        share_url,
        web_url: Some(web_url),
        app_url: Some(app_url),
    }
}

/// Build the field-scoped query for the exact search.
///
/// Double quotes are removed from values since they delimit the filters.
pub fn exact_query(title: &str, artist: &str, album: &str) -> String {
    let mut parts = vec![format!("track:\"{}\"", strip_quotes(title))];
    if !artist.trim().is_empty() {
        parts.push(format!("artist:\"{}\"", strip_quotes(artist)));
    }
    if !album.trim().is_empty() {
        parts.push(format!("album:\"{}\"", strip_quotes(album)));
    }
    parts.join(" ")
}

/// Free-text query for the fallback search.
pub fn fallback_query(title: &str, artist: &str) -> String {
    format!("{} {}", strip_quotes(title), strip_quotes(artist))
        .trim()
        .to_string()
}

fn strip_quotes(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

/// First candidate with an artist name containing the query artist (case-insensitive).
pub fn pick_by_artist(items: Vec<dto::Track>, artist: &str) -> Option<dto::Track> {
    let wanted = artist.trim().to_lowercase();
    if wanted.is_empty() {
        return items.into_iter().next();
    }
    items.into_iter().find(|track| {
        track.artists.iter().any(|a| {
            let name = a.name.to_lowercase();
            name.contains(&wanted)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_track(id: &str, name: &str, artists: &[&str]) -> dto::Track {
        dto::Track {
            id: id.to_string(),
            name: name.to_string(),
            uri: None,
            artists: artists
                .iter()
                .map(|a| dto::Artist { name: a.to_string() })
                .collect(),
            album: Some(dto::Album {
                name: "Help!".to_string(),
            }),
            external_urls: dto::ExternalUrls::default(),
        }
    }

    #[test]
    fn test_to_match_builds_links() {
        let mut track = make_track("abc", "Yesterday", &["The Beatles"]);
        track.external_urls.spotify = Some("https://open.spotify.com/track/abc".to_string());
        track.uri = Some("spotify:track:abc".to_string());

        let m = to_match(track, &ProviderId::new("Spotify"));
        assert_eq!(m.provider.as_str(), "Spotify");
        assert_eq!(m.track_id, "abc");
        assert_eq!(m.album, "Help!");
        assert_eq!(m.share_url, "https://open.spotify.com/track/abc");
        assert_eq!(m.web_url.as_deref(), Some("https://open.spotify.com/track/abc"));
        assert_eq!(m.app_url.as_deref(), Some("spotify:track:abc"));
    }

    #[test]
    fn test_to_match_without_urls_synthesizes_them() {
        let track = make_track("xyz", "Song", &["A", "B"]);
        let m = to_match(track, &ProviderId::new("Spotify"));
        assert_eq!(m.artist, "A, B");
        assert_eq!(m.share_url, "https://open.spotify.com/track/xyz");
        assert_eq!(m.app_url.as_deref(), Some("spotify:track:xyz"));
    }

    #[test]
    fn test_exact_query() {
        assert_eq!(
            exact_query("Yesterday", "The Beatles", "Help!"),
            r#"track:"Yesterday" artist:"The Beatles" album:"Help!""#
        );
        assert_eq!(exact_query("Say \"Hi\"", "X", ""), r#"track:"Say Hi" artist:"X""#);
    }

    #[test]
    fn test_fallback_query() {
        assert_eq!(fallback_query("Yesterday", "The Beatles"), "Yesterday The Beatles");
        assert_eq!(fallback_query("Yesterday", ""), "Yesterday");
    }

    #[test]
    fn test_pick_by_artist() {
        let items = vec![
            make_track("1", "Yesterday", &["Some Cover Band"]),
            make_track("2", "Yesterday", &["The Beatles"]),
        ];
        let picked = pick_by_artist(items.clone(), "beatles").unwrap();
        assert_eq!(picked.id, "2");

        assert!(pick_by_artist(items.clone(), "Oasis").is_none());
        assert_eq!(pick_by_artist(items, "").unwrap().id, "1");
    }

    #[test]
    fn test_pick_by_artist_ignores_short_names_inside_query() {
        let items = vec![
            make_track("cover", "Yesterday", &["A"]),
            make_track("orig", "Yesterday", &["The Beatles"]),
        ];
        assert_eq!(pick_by_artist(items, "The Beatles").unwrap().id, "orig");

        let items = vec![make_track("1", "Yesterday", &["The Beatles"])];
        assert!(pick_by_artist(items, "The Beatles feat. Billy Preston").is_none());
    }
}
