//! YouTube Data API integration
//!
//! Finds the single best video for a track via the v3 `search.list` endpoint.
//! Requires an API key; each search costs 100 quota units.
//!
//! API docs: https://developers.google.com/youtube/v3/docs/search/list

pub mod dto;
mod client;

pub use client::YouTubeClient;
