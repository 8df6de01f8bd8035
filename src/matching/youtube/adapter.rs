//! Adapter layer: Convert YouTube search results to scoring candidates and matches

use super::dto;
use crate::matching::domain::{ProviderId, SearchMatch};
use crate::matching::scoring::{self, Candidate};

/// Video results only, with HTML entities decoded.
pub fn to_candidates(response: dto::SearchListResponse) -> Vec<Candidate> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet?;
            Some(Candidate::new(
                video_id,
                scoring::decode_html_entities(&snippet.title),
                scoring::decode_html_entities(&snippet.channel_title),
            ))
        })
        .collect()
}

/// Build a match for the chosen candidate, cleaning its title/artist against the query.
pub fn to_match(
    candidate: &Candidate,
    title: &str,
    artist: &str,
    album: &str,
    provider: &ProviderId,
) -> SearchMatch {
    let fields = scoring::resolve_fields(candidate, title, artist);
    SearchMatch {
        provider: provider.clone(),
        track_id: candidate.id.clone(),
        title: fields.title,
        artist: fields.artist,
        album: album.to_string(),
        share_url: format!("https://music.youtube.com/watch?v={}", candidate.id),
        web_url: Some(format!("https://www.youtube.com/watch?v={}", candidate.id)),
        app_url: None,
    }
}

/// Free-text query from the non-empty fields.
pub fn query(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(video_id: Option<&str>, title: &str, channel: &str) -> dto::SearchResult {
        dto::SearchResult {
            id: dto::ResourceId {
                kind: Some("youtube#video".to_string()),
                video_id: video_id.map(String::from),
            },
            snippet: Some(dto::Snippet {
                title: title.to_string(),
                channel_title: channel.to_string(),
            }),
        }
    }

    #[test]
    fn test_to_candidates_skips_non_videos_and_decodes() {
        let response = dto::SearchListResponse {
            items: vec![
                result(None, "A channel", "Someone"),
                result(Some("v1"), "Guns N&#39; Roses - Patience", "GunsNRosesVEVO"),
            ],
        };
        let candidates = to_candidates(response);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "v1");
        assert_eq!(candidates[0].title, "Guns N' Roses - Patience");
    }

    #[test]
    fn test_to_match_links_and_fields() {
        let c = Candidate::new("xyz", "The Beatles - Yesterday (Official Audio)", "The Beatles");
        let m = to_match(&c, "Yesterday", "The Beatles", "Help!", &ProviderId::new("YouTube Music"));
        assert_eq!(m.title, "Yesterday");
        assert_eq!(m.artist, "The Beatles");
        assert_eq!(m.album, "Help!");
        assert_eq!(m.share_url, "https://music.youtube.com/watch?v=xyz");
        assert_eq!(m.web_url.as_deref(), Some("https://www.youtube.com/watch?v=xyz"));
        assert!(m.app_url.is_none());
    }

    #[test]
    fn test_query_skips_blank_fields() {
        assert_eq!(query(&["Yesterday", " ", "The Beatles"]), "Yesterday The Beatles");
    }
}
