//! Spotify Web API integration
//!
//! Token-based catalog with structured track metadata.
//! API docs: https://developer.spotify.com/documentation/web-api

mod adapter;
mod auth;
mod client;
pub mod dto;

pub use client::{SPOTIFY, SpotifyProvider};
