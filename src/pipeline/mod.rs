//! Acquisition pipeline - album name in, tagged audio files out.
//!
//! # Architecture
//!
//! The pipeline keeps external services behind a thin edge:
//! - **Domain models** (`domain.rs`) - listings, artifacts, track states and errors
//! - **API DTOs** (`discogs/dto.rs`, `youtube/dto.rs`) - exact response shapes
//! - **Adapters** - convert DTOs to domain models
//! - **Clients** - Discogs, YouTube, iTunes over HTTP; yt-dlp and ffmpeg as subprocesses
//! - **Stages** - `catalog`, `matcher`, `stream`, `transcode`
//! - **Service** - the coordinator that sequences the stages per track
//!
//! The coordinator only sees the traits in `traits.rs`, so every stage can be
//! exercised against mocks.
//!
//! # Usage
//!
//! ```ignore
//! use pipeline::Pipeline;
//!
//! let pipeline = Pipeline::from_config(&config)?;
//! let report = pipeline.run_album("Thriller").await?;
//! for outcome in &report.outcomes {
//!     println!("{}: {}", outcome.title, outcome.state.name());
//! }
//! ```

pub mod artwork;
pub mod catalog;
pub mod discogs;
pub mod domain;
pub mod matcher;
pub mod query;
pub mod service;
pub mod stream;
pub mod traits;
pub mod transcode;
pub mod youtube;
pub mod ytdlp;

pub use artwork::CoverSize;
pub use domain::{AlbumReport, PipelineError, TagSet};
pub use service::{Collaborators, Pipeline, PipelineSettings, describe_failure};
pub use transcode::FfmpegTranscoder;
pub use ytdlp::YtDlpProvider;
