//! Album artwork lookup via the iTunes Search API
//!
//! No API key required. Search results carry a 100px artwork URL that the
//! image CDN will serve at other sizes when the size segment is rewritten.
//!
//! API: https://performance-partners.apple.com/search-api

use serde::{Deserialize, Serialize};

use super::domain::{CoverImage, PipelineError};

const SERVICE: &str = "iTunes";

/// Desired cover art size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverSize {
    /// 100px thumbnail
    Small,
    /// 600px (default)
    #[default]
    Medium,
    /// 1200px
    Large,
}

impl CoverSize {
    pub fn pixels(self) -> u32 {
        match self {
            CoverSize::Small => 100,
            CoverSize::Medium => 600,
            CoverSize::Large => 1200,
        }
    }
}

/// iTunes artwork client
pub struct ItunesArtworkClient {
    http_client: reqwest::Client,
    base_url: String,
    size: CoverSize,
}

impl ItunesArtworkClient {
    /// Create a new client
    pub fn new(size: CoverSize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: "https://itunes.apple.com".to_string(),
            size,
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>, size: CoverSize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            size,
        }
    }

    /// Search for an album and download the first result's artwork
    pub async fn find_cover(&self, query: &str) -> Result<Option<CoverImage>, PipelineError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("term", query), ("entity", "album"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, None, e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let body = response.json::<SearchResponse>().await.map_err(|e| {
            PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                format!("failed to parse response: {e}"),
            )
        })?;

        let Some(artwork) = first_artwork_url(body) else {
            return Ok(None);
        };

        let url = resize_artwork_url(&artwork, self.size);
        self.download_image(&url).await.map(Some)
    }

    /// Download an image from a URL
    async fn download_image(&self, url: &str) -> Result<CoverImage, PipelineError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, None, e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(PipelineError::upstream(
                SERVICE,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        // Get content type
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, None, e.to_string()))?
            .to_vec();

        Ok(CoverImage {
            data,
            mime_type,
            url: url.to_string(),
        })
    }
}

/// iTunes search response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    result_count: u32,
    #[serde(default)]
    results: Vec<AlbumResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumResult {
    collection_name: Option<String>,
    artwork_url100: Option<String>,
}

fn first_artwork_url(response: SearchResponse) -> Option<String> {
    response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.artwork_url100)
        .filter(|u| !u.is_empty())
}

/// Rewrite the `100x100bb` size segment of an artwork URL
fn resize_artwork_url(url: &str, size: CoverSize) -> String {
    let px = size.pixels();
    url.replace("100x100bb", &format!("{px}x{px}bb"))
}
