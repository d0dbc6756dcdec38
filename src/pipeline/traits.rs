//! Trait definitions for the pipeline's external collaborators.
//!
//! The coordinator only talks to these traits. Production code wires in the
//! real clients (Discogs, YouTube, yt-dlp, ffmpeg, iTunes), while tests
//! substitute the mocks at the bottom of this file.

use std::path::Path;

use async_trait::async_trait;

use super::catalog::{CatalogHit, MasterRelease};
use super::domain::{AudioArtifact, CoverImage, PipelineError, TagSet, TaggedAudioFile, VideoMatch};
use super::stream::{ByteStream, MediaFormat, VideoMetadata};

/// Album catalog with a search step and a master-resource step.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search for master releases, in the catalog's own ranking order.
    async fn search(&self, query: &str) -> Result<Vec<CatalogHit>, PipelineError>;

    /// Fetch a master resource by the reference a search hit carried.
    async fn fetch_master(&self, master_ref: &str) -> Result<MasterRelease, PipelineError>;
}

/// Video search returning ranked video identifiers.
#[async_trait]
pub trait VideoSearchApi: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>, PipelineError>;
}

/// Media provider that exposes the encodings of a video.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Resolve the formats available for a video, in provider order.
    async fn metadata(&self, video: &VideoMatch) -> Result<VideoMetadata, PipelineError>;

    /// Open the byte stream for one format.
    async fn open_stream(&self, format: &MediaFormat) -> Result<ByteStream, PipelineError>;
}

/// Converts a scratch artifact into a tagged output file.
///
/// Implementations take the artifact by value and must not keep it past
/// return, so the scratch file is gone whether or not the call succeeds.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        artifact: AudioArtifact,
        output: &Path,
        tags: &TagSet,
        cover: Option<&Path>,
    ) -> Result<TaggedAudioFile, PipelineError>;
}

/// Image search used to find album artwork.
#[async_trait]
pub trait ImageSearchApi: Send + Sync {
    async fn find_cover(&self, query: &str) -> Result<Option<CoverImage>, PipelineError>;
}

// Implement traits for real clients

#[async_trait]
impl CatalogApi for super::discogs::DiscogsClient {
    async fn search(&self, query: &str) -> Result<Vec<CatalogHit>, PipelineError> {
        self.search(query).await
    }

    async fn fetch_master(&self, master_ref: &str) -> Result<MasterRelease, PipelineError> {
        self.fetch_master(master_ref).await
    }
}

#[async_trait]
impl VideoSearchApi for super::youtube::YouTubeClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>, PipelineError> {
        self.search(query, max_results).await
    }
}

#[async_trait]
impl StreamProvider for super::ytdlp::YtDlpProvider {
    async fn metadata(&self, video: &VideoMatch) -> Result<VideoMetadata, PipelineError> {
        self.metadata(video).await
    }

    async fn open_stream(&self, format: &MediaFormat) -> Result<ByteStream, PipelineError> {
        self.open_stream(format).await
    }
}

#[async_trait]
impl Transcoder for super::transcode::FfmpegTranscoder {
    async fn transcode(
        &self,
        artifact: AudioArtifact,
        output: &Path,
        tags: &TagSet,
        cover: Option<&Path>,
    ) -> Result<TaggedAudioFile, PipelineError> {
        self.transcode(artifact, output, tags, cover).await
    }
}

#[async_trait]
impl ImageSearchApi for super::artwork::ItunesArtworkClient {
    async fn find_cover(&self, query: &str) -> Result<Option<CoverImage>, PipelineError> {
        self.find_cover(query).await
    }
}
