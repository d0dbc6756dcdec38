//! Test utilities and fixtures for album-fetch tests.
//!
//! This module provides common fixtures and a mock pipeline builder to
//! reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::MockPipeline;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let mock = MockPipeline::thriller();
//!     let report = mock.build().run_album("Thriller").await.unwrap();
//!     assert_eq!(mock.transcoder.calls().len(), 9);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::pipeline::domain::{AudioArtifact, VideoMatch};
use crate::pipeline::traits::mocks::{
    MockCatalog, MockImageSearch, MockStreamProvider, MockTranscoder, MockVideoSearch,
};
use crate::pipeline::{Collaborators, Pipeline, PipelineSettings};

/// Tracklist of "Thriller" (1982), in album order.
pub const THRILLER_TRACKS: &[&str] = &[
    "Wanna Be Startin' Somethin'",
    "Baby Be Mine",
    "The Girl Is Mine",
    "Thriller",
    "Beat It",
    "Billie Jean",
    "Human Nature",
    "P.Y.T. (Pretty Young Thing)",
    "The Lady in My Life",
];

/// Creates a scratch artifact with a few bytes of fake audio in `dir`.
///
/// The file is deleted when the artifact is dropped.
pub fn scratch_artifact(dir: &Path, video_id: &str) -> AudioArtifact {
    let payload = b"fake audio payload";
    let file = tempfile::Builder::new()
        .prefix(&format!("{video_id}-"))
        .suffix(".m4a")
        .tempfile_in(dir)
        .expect("Failed to create scratch file");
    std::fs::write(file.path(), payload).expect("Failed to write scratch file");

    AudioArtifact::new(
        file.into_temp_path(),
        "m4a",
        VideoMatch(video_id.to_string()),
        payload.len() as u64,
    )
}

/// A pipeline wired entirely to mocks, with its own temp directory.
///
/// The mocks stay reachable through the public fields so tests can inspect
/// what the pipeline asked of them. Swap a mock with the `with_*` methods
/// before calling [`MockPipeline::build`].
pub struct MockPipeline {
    pub catalog: Arc<MockCatalog>,
    pub search: Arc<MockVideoSearch>,
    pub streams: Arc<MockStreamProvider>,
    pub transcoder: Arc<MockTranscoder>,
    pub images: Option<Arc<MockImageSearch>>,
    dir: TempDir,
}

impl MockPipeline {
    /// Mocks that resolve "Thriller" by Michael Jackson and succeed for every track.
    pub fn thriller() -> Self {
        Self {
            catalog: Arc::new(MockCatalog::album(
                "Thriller",
                "Michael Jackson",
                THRILLER_TRACKS,
            )),
            search: Arc::new(MockVideoSearch::new()),
            streams: Arc::new(MockStreamProvider::with_audio(b"fake m4a audio stream")),
            transcoder: Arc::new(MockTranscoder::new()),
            images: None,
            dir: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    pub fn with_catalog(mut self, catalog: MockCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_search(mut self, search: MockVideoSearch) -> Self {
        self.search = Arc::new(search);
        self
    }

    pub fn with_transcoder(mut self, transcoder: MockTranscoder) -> Self {
        self.transcoder = Arc::new(transcoder);
        self
    }

    pub fn with_images(mut self, images: MockImageSearch) -> Self {
        self.images = Some(Arc::new(images));
        self
    }

    /// Make the stream of one video unavailable.
    pub fn with_stream_unavailable(mut self, video_id: &str) -> Self {
        let streams = MockStreamProvider::with_audio(&self.streams.payload).unavailable_for(video_id);
        self.streams = Arc::new(streams);
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn build(&self) -> Pipeline {
        let images = self
            .images
            .clone()
            .map(|i| i as Arc<dyn crate::pipeline::traits::ImageSearchApi>);

        let collaborators = Collaborators {
            catalog: self.catalog.clone(),
            search: self.search.clone(),
            streams: self.streams.clone(),
            transcoder: self.transcoder.clone(),
            images,
        };
        let settings = PipelineSettings {
            output_dir: self.output_dir(),
            scratch_dir: self.scratch_dir(),
            concurrency: 4,
            embed_cover: true,
            extension: "mp3".to_string(),
        };

        Pipeline::new(collaborators, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_artifact_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = scratch_artifact(dir.path(), "Zi_XLOBDo_Y");
        let path = artifact.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(artifact.bytes, std::fs::metadata(&path).unwrap().len());
        assert_eq!(artifact.video.id(), "Zi_XLOBDo_Y");

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_mock_pipeline_dirs() {
        let mock = MockPipeline::thriller();
        assert_ne!(mock.output_dir(), mock.scratch_dir());
        assert!(mock.output_dir().starts_with(mock.dir.path()));
        assert_eq!(THRILLER_TRACKS.len(), 9);
    }
}
