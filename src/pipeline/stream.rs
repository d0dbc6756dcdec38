//! Stream fetching: video id to a raw audio artifact on disk.
//!
//! Format selection takes the first audio-only encoding in the order the
//! provider lists them. No bitrate or codec preference is applied; with
//! yt-dlp (which lists worst to best) that means the smallest audio stream.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::domain::{AudioArtifact, PipelineError, VideoMatch};
use super::query::sanitize_filename;
use super::traits::StreamProvider;

/// Chunked byte stream of one media encoding.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, PipelineError>> + Send>>;

/// One downloadable encoding of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFormat {
    pub format_id: String,
    /// Container / file extension ("m4a", "webm", ...)
    pub container: String,
    pub url: String,
    pub has_audio: bool,
    pub has_video: bool,
    /// Headers the host expects on the stream request
    pub headers: Vec<(String, String)>,
}

impl MediaFormat {
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    #[cfg(test)]
    pub fn test_format(format_id: &str, container: &str, has_audio: bool, has_video: bool) -> Self {
        Self {
            format_id: format_id.to_string(),
            container: container.to_string(),
            url: format!("https://media.example.com/{format_id}"),
            has_audio,
            has_video,
            headers: vec![],
        }
    }
}

/// Video metadata as the stream provider reports it.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub video: VideoMatch,
    pub title: Option<String>,
    /// Encodings in provider order
    pub formats: Vec<MediaFormat>,
}

/// Pick the first audio-only format.
pub fn select_audio_format(formats: &[MediaFormat]) -> Option<&MediaFormat> {
    formats.iter().find(|f| f.is_audio_only())
}

/// Downloads audio streams into a scratch directory.
pub struct StreamFetcher {
    scratch_dir: PathBuf,
}

impl StreamFetcher {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Fetch the audio of a video into a scratch artifact.
    ///
    /// The scratch file name starts with the video id and carries a random
    /// component, so concurrent tracks (even ones that matched the same
    /// video) never share a file. If anything fails midway the partial file
    /// is removed.
    pub async fn fetch_audio(
        &self,
        provider: &dyn StreamProvider,
        video: &VideoMatch,
    ) -> Result<AudioArtifact, PipelineError> {
        let metadata = provider.metadata(video).await?;

        let format = select_audio_format(&metadata.formats)
            .ok_or_else(|| PipelineError::NoAudioFormat(video.id().to_string()))?;
        tracing::debug!(
            "Video {} ({}) -> format {} ({})",
            video,
            metadata.title.as_deref().unwrap_or("untitled"),
            format.format_id,
            format.container
        );

        let mut stream = provider.open_stream(format).await?;

        let scratch = self.create_scratch(video, &format.container).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&scratch)
            .await
            .map_err(|e| PipelineError::io(format!("failed to open {}", scratch.display()), e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| PipelineError::io(format!("failed to write {}", scratch.display()), e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| PipelineError::io(format!("failed to flush {}", scratch.display()), e))?;

        tracing::info!("Downloaded {} bytes of audio for video {}", written, video);

        Ok(AudioArtifact::new(scratch, format.container.clone(), video.clone(), written))
    }

    /// Create an empty, uniquely named scratch file for a video.
    async fn create_scratch(&self, video: &VideoMatch, container: &str) -> Result<TempPath, PipelineError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await.map_err(|e| {
            PipelineError::io(format!("failed to create {}", self.scratch_dir.display()), e)
        })?;

        let prefix = format!("{}-", sanitize_filename(video.id()));
        let suffix = format!(".{}", sanitize_filename(container));

        tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)
            .map(|file| file.into_temp_path())
            .map_err(|e| PipelineError::io("failed to create scratch file", e))
    }
}
