//! Discogs HTTP client
//!
//! Handles communication with the Discogs database API.
//! See: https://www.discogs.com/developers
//!
//! IMPORTANT: Discogs rejects requests without a User-Agent header.

use serde::de::DeserializeOwned;

use super::{adapter, dto};
use crate::pipeline::catalog::{CatalogHit, MasterRelease};
use crate::pipeline::domain::PipelineError;

const SERVICE: &str = "Discogs";

/// User agent string - Discogs requires this
const USER_AGENT: &str = concat!(
    "AlbumFetch/",
    env!("CARGO_PKG_VERSION"),
    " +https://github.com/album-fetch/album-fetch"
);

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    token: String,
    base_url: String,
}

impl DiscogsClient {
    /// Create a new client authenticated with a personal access token
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, "https://api.discogs.com")
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    /// Search master releases matching an album name
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogHit>, PipelineError> {
        let url = format!("{}/database/search", self.base_url);
        let request = self
            .http_client
            .get(&url)
            .query(&[("q", query), ("type", "master")]);

        let response: dto::SearchResponse = self.send(request).await?;
        Ok(adapter::to_hits(response))
    }

    /// Fetch a master release by API URL or bare master id
    pub async fn fetch_master(&self, master_ref: &str) -> Result<MasterRelease, PipelineError> {
        let url = self.master_url(master_ref);
        let response: dto::MasterResponse = self.send(self.http_client.get(&url)).await?;
        Ok(adapter::to_master(response))
    }

    fn master_url(&self, master_ref: &str) -> String {
        if master_ref.starts_with("http://") || master_ref.starts_with("https://") {
            master_ref.to_string()
        } else {
            format!("{}/masters/{}", self.base_url, master_ref.trim_start_matches('/'))
        }
    }

    /// Send an authenticated request and parse the JSON body
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PipelineError> {
        let response = request
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Discogs token={}", self.token),
            )
            .send()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, None, e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(PipelineError::upstream(
                    SERVICE,
                    Some(status.as_u16()),
                    error.message,
                ));
            }
            return Err(PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                format!("failed to parse response: {e}"),
            )
        })
    }
}
