//! YouTube Data API v3 Data Transfer Objects
//!
//! Only the fields of `search.list` we read are modelled here.

use serde::{Deserialize, Serialize};

/// `search.list` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One ranked search result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchItem {
    pub id: ResourceId,
}

/// Identifies the resource a result points at
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    /// "youtube#video", "youtube#channel", "youtube#playlist"
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub code: Option<u16>,
    pub message: String,
}
