//! YouTube Music integration via the YouTube Data API
//!
//! Key-based catalog with noisy, video-style metadata.
//! API docs: https://developers.google.com/youtube/v3/docs/search/list

mod adapter;
mod client;
pub mod dto;

pub use client::{YOUTUBE_MUSIC, YouTubeMusicProvider};
