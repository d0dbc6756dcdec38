//! Stream provider backed by the `yt-dlp` command-line tool.
//!
//! `yt-dlp -J` resolves a video's formats (including the signed stream
//! URLs); the chosen format is then downloaded directly over HTTP so the
//! bytes flow through our own fetcher and scratch handling.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `pipx install yt-dlp` or your distribution's package

use std::collections::BTreeMap;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use super::domain::{PipelineError, VideoMatch};
use super::stream::{ByteStream, MediaFormat, VideoMetadata};

/// Stream provider that shells out to yt-dlp for metadata
pub struct YtDlpProvider {
    binary: String,
    http_client: reqwest::Client,
}

impl YtDlpProvider {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Resolve the formats of a video
    pub async fn metadata(&self, video: &VideoMatch) -> Result<VideoMetadata, PipelineError> {
        let output = Command::new(&self.binary)
            .args(["-J", "--no-playlist", "--no-warnings", "--"])
            .arg(watch_url(video))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PipelineError::StreamUnavailable(format!("failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("yt-dlp failed");
            return Err(PipelineError::StreamUnavailable(format!(
                "{}: {}",
                video,
                reason.trim()
            )));
        }

        parse_metadata(video, &output.stdout)
    }

    /// Open the HTTP stream of a format as a chunk stream
    pub async fn open_stream(&self, format: &MediaFormat) -> Result<ByteStream, PipelineError> {
        let mut request = self.http_client.get(&format.url);
        for (name, value) in &format.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::StreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::StreamUnavailable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let chunks = futures::stream::try_unfold(response, |mut response| async move {
            match response.chunk().await {
                Ok(Some(chunk)) => Ok(Some((chunk.to_vec(), response))),
                Ok(None) => Ok(None),
                Err(e) => Err(PipelineError::StreamUnavailable(e.to_string())),
            }
        });

        Ok(Box::pin(chunks))
    }

    /// Get yt-dlp version string (for diagnostics)
    pub async fn version(&self) -> Option<String> {
        Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }
}

fn watch_url(video: &VideoMatch) -> String {
    format!(
        "https://www.youtube.com/watch?v={}",
        urlencoding::encode(video.id())
    )
}

/// Parse the JSON output of `yt-dlp -J`
fn parse_metadata(video: &VideoMatch, json: &[u8]) -> Result<VideoMetadata, PipelineError> {
    let info: YtDlpInfo = serde_json::from_slice(json).map_err(|e| {
        PipelineError::upstream("yt-dlp", None, format!("failed to parse metadata: {e}"))
    })?;

    let formats = info
        .formats
        .into_iter()
        .filter(|f| is_direct_download(f.protocol.as_deref()))
        .filter_map(|f| {
            let url = f.url?;
            Some(MediaFormat {
                format_id: f.format_id,
                container: f.ext.unwrap_or_else(|| "bin".to_string()),
                url,
                has_audio: is_present_codec(f.acodec.as_deref()),
                has_video: is_present_codec(f.vcodec.as_deref()),
                headers: f.http_headers.into_iter().collect(),
            })
        })
        .collect();

    Ok(VideoMetadata {
        video: video.clone(),
        title: info.title,
        formats,
    })
}

/// yt-dlp reports a missing stream as the codec "none"
fn is_present_codec(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

/// Manifest formats (HLS, DASH) need a segment downloader; only plain HTTP
/// formats can be fetched with a single GET
fn is_direct_download(protocol: Option<&str>) -> bool {
    matches!(protocol, None | Some("http") | Some("https"))
}

/// `yt-dlp -J` output (only the fields we read)
#[derive(Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Deserialize)]
struct YtDlpFormat {
    format_id: String,
    ext: Option<String>,
    url: Option<String>,
    protocol: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    #[serde(default)]
    http_headers: BTreeMap<String, String>,
}
