//! Discogs API Data Transfer Objects
//!
//! These types match what the Discogs database API returns.
//! DO NOT use these types outside the discogs module - convert to domain types.
//!
//! We use two endpoints:
//! - `/database/search?type=master` to find the master release for an album name
//! - `/masters/{id}` (the `master_url` of a search result) for the tracklist

use serde::{Deserialize, Serialize};

/// Database search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One search result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: Option<u64>,
    /// Result type (master, release, artist, label)
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    /// "Artist - Title" display string
    pub title: Option<String>,
    pub master_id: Option<u64>,
    /// API URL of the master release
    pub master_url: Option<String>,
    /// API URL of this result itself
    pub resource_url: Option<String>,
    pub cover_image: Option<String>,
    /// Year as a string (Discogs returns "1982")
    pub year: Option<String>,
}

/// Master release resource
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MasterResponse {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub tracklist: Vec<TracklistEntry>,
}

/// Artist credit on a release
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    /// Name, possibly with a numeric disambiguator like "Nirvana (2)"
    pub name: String,
    /// Artist name variation used on this release
    pub anv: Option<String>,
    /// Join string to the next credit
    pub join: Option<String>,
}

/// Tracklist entry (tracks, headings and index tracks share this shape)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracklistEntry {
    /// Position on the release ("A1", "2-05", or empty for headings)
    #[serde(default)]
    pub position: String,
    /// Entry type: "track", "heading" or "index"
    #[serde(rename = "type_")]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Duration as "m:ss" (often empty)
    pub duration: Option<String>,
    /// Parts of an index track (movements of a multi-part work)
    #[serde(default)]
    pub sub_tracks: Vec<TracklistEntry>,
}

/// Error response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
}
