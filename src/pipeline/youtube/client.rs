//! YouTube Data API HTTP client

use super::dto;
use crate::pipeline::domain::PipelineError;

const SERVICE: &str = "YouTube";

/// YouTube Data API client
pub struct YouTubeClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://www.googleapis.com/youtube/v3")
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Search videos and return their ids in relevance order
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>, PipelineError> {
        let url = format!("{}/search", self.base_url);
        let max_results = max_results.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "id"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, None, e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ErrorResponse>().await {
                return Err(PipelineError::upstream(
                    SERVICE,
                    Some(status.as_u16()),
                    error.error.message,
                ));
            }
            return Err(PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let body = response
            .json::<dto::SearchListResponse>()
            .await
            .map_err(|e| {
                PipelineError::upstream(
                    SERVICE,
                    Some(status.as_u16()),
                    format!("failed to parse response: {e}"),
                )
            })?;

        Ok(video_ids(body))
    }
}

/// Extract video ids, skipping channel or playlist results
fn video_ids(response: dto::SearchListResponse) -> Vec<String> {
    response
        .items
        .into_iter()
        .filter_map(|item| item.id.video_id)
        .filter(|id| !id.is_empty())
        .collect()
}
