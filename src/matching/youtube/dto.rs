//! YouTube Data API v3 Data Transfer Objects
//!
//! Only the fields of `search.list` we actually read.
//! DO NOT use these types outside the youtube module - convert to domain types.
//!
//! API Reference: https://developers.google.com/youtube/v3/docs/search/list

use serde::{Deserialize, Serialize};

/// `search.list` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: Option<Snippet>,
}

/// Which resource a result points at; only videos carry `videoId`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// HTML-escaped display title
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
}

/// Google API error envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}
