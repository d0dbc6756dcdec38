//! Internal domain models for the acquisition pipeline.
//!
//! These types are OUR types - they don't change when the catalog, search or
//! stream provider APIs change. External responses get converted into them
//! at the edge of each client module.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;

/// Ordered tracklist for one album, taken from the first catalog result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackListing {
    /// Tracks in catalog order
    pub tracks: Vec<Track>,
    /// First listed artist (empty if the catalog lists none)
    pub artist: String,
    /// Release title (empty if unavailable)
    pub album_title: String,
}

/// A single track of a listing. The title is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
}

impl Track {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Identifier of the one video chosen for a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoMatch(pub String);

impl VideoMatch {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata written into the output container's tag fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Raw audio stream materialized into a scratch file.
///
/// The artifact owns its scratch file: dropping it deletes the file. The
/// transcoder takes it by value, so it never outlives that step.
#[derive(Debug)]
pub struct AudioArtifact {
    path: TempPath,
    /// Container of the raw stream (e.g. "m4a", "webm")
    pub container: String,
    /// Video the stream came from
    pub video: VideoMatch,
    /// Number of bytes written
    pub bytes: u64,
}

impl AudioArtifact {
    pub fn new(path: TempPath, container: impl Into<String>, video: VideoMatch, bytes: u64) -> Self {
        Self {
            path,
            container: container.into(),
            video,
            bytes,
        }
    }

    /// Location of the scratch file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Final tagged output, owned by the caller once delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedAudioFile {
    pub path: PathBuf,
    pub tags: TagSet,
    /// Whether a cover image was muxed in
    pub has_cover: bool,
}

/// Album artwork downloaded from an image search result.
#[derive(Debug, Clone)]
pub struct CoverImage {
    /// Image data (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type reported by the image host
    pub mime_type: String,
    /// Source URL
    pub url: String,
}

impl CoverImage {
    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

/// A cover image written to scratch storage so the transcoder can read it.
/// The file is removed when the last reference is dropped.
#[derive(Debug)]
pub struct StagedCover {
    pub image: CoverImage,
    path: TempPath,
}

impl StagedCover {
    pub fn new(image: CoverImage, path: TempPath) -> Self {
        Self { image, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Immutable album-scoped values passed into every track pipeline.
#[derive(Debug, Clone, Default)]
pub struct AlbumContext {
    pub artist: String,
    pub album_title: String,
    pub cover: Option<Arc<StagedCover>>,
}

impl AlbumContext {
    pub fn new(artist: impl Into<String>, album_title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album_title: album_title.into(),
            cover: None,
        }
    }

    pub fn with_cover(mut self, cover: Option<Arc<StagedCover>>) -> Self {
        self.cover = cover;
        self
    }

    pub fn cover_path(&self) -> Option<&Path> {
        self.cover.as_deref().map(StagedCover::path)
    }

    /// Tags for one track of this album
    pub fn tags_for(&self, track: &Track) -> TagSet {
        TagSet {
            title: track.title.clone(),
            artist: self.artist.clone(),
            album: self.album_title.clone(),
        }
    }
}

/// Per-track stage that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Match,
    Fetch,
    Transcode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Match => "match",
            Stage::Fetch => "fetch",
            Stage::Transcode => "transcode",
        };
        f.write_str(name)
    }
}

/// Per-track state machine.
///
/// `Pending -> Matched -> Fetched -> Transcoded -> Delivered`, or `Failed`
/// from any non-terminal state. A `Fetched` state owns the scratch artifact,
/// so leaving it (by transcoding or failing) releases the file.
#[derive(Debug)]
pub enum TrackState {
    Pending,
    Matched(VideoMatch),
    Fetched(AudioArtifact),
    Transcoded(TaggedAudioFile),
    Delivered(TaggedAudioFile),
    Failed { stage: Stage, error: PipelineError },
}

impl TrackState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackState::Delivered(_) | TrackState::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackState::Pending => "pending",
            TrackState::Matched(_) => "matched",
            TrackState::Fetched(_) => "fetched",
            TrackState::Transcoded(_) => "transcoded",
            TrackState::Delivered(_) => "delivered",
            TrackState::Failed { .. } => "failed",
        }
    }

    /// The stage that runs next from this state, if any.
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            TrackState::Pending => Some(Stage::Match),
            TrackState::Matched(_) => Some(Stage::Fetch),
            TrackState::Fetched(_) => Some(Stage::Transcode),
            _ => None,
        }
    }
}

/// Reported result for one track of an album run.
#[derive(Debug)]
pub struct TrackOutcome {
    /// Position in the listing (0-based)
    pub index: usize,
    pub title: String,
    pub state: TrackState,
}

impl TrackOutcome {
    pub fn file(&self) -> Option<&TaggedAudioFile> {
        match &self.state {
            TrackState::Delivered(file) => Some(file),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<(Stage, &PipelineError)> {
        match &self.state {
            TrackState::Failed { stage, error } => Some((*stage, error)),
            _ => None,
        }
    }
}

/// Everything an album run produced.
#[derive(Debug)]
pub struct AlbumReport {
    pub listing: TrackListing,
    /// One outcome per track, in listing order
    pub outcomes: Vec<TrackOutcome>,
}

impl AlbumReport {
    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.file().is_some()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.delivered_count()
    }
}

/// Errors that can occur while acquiring an album or a track
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No catalog results for \"{0}\"")]
    NoSearchResults(String),

    #[error("No tracks found for this album")]
    NoTracksFound,

    #[error("No video found for \"{0}\"")]
    NoMatch(String),

    #[error("No audio format available for video {0}")]
    NoAudioFormat(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl PipelineError {
    /// Create an upstream (transport/parse) error.
    pub fn upstream(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    /// Create an I/O failure with context.
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        Self::IoFailure(format!("{context}: {err}"))
    }
}
