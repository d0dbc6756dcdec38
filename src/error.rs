//! Application-wide error types.
//!
//! The pipeline reports failures through [`PipelineError`]; this module
//! wraps those together with tag read-back and configuration failures.
//! CLI/main uses `anyhow` on top for convenient propagation.
//!
//! # Example
//!
//! ```ignore
//! use album_fetch::error::ResultExt;
//!
//! let listing = pipeline
//!     .resolve_tracklist("Thriller")
//!     .await
//!     .with_context("Could not resolve tracklist")?;
//! ```

use std::path::PathBuf;

use crate::pipeline::PipelineError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Album or track acquisition error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Tag read-back error
    #[error("Tag error for {path}: {message}")]
    Tags { path: PathBuf, message: String },

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a tag error.
    pub fn tags(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Tags {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Pipeline(e).context(ctx))
    }
}
