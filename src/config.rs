//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\album-fetch\config.toml
//! - macOS: ~/Library/Application Support/album-fetch/config.toml
//! - Linux: ~/.config/album-fetch/config.toml
//!
//! The config file is human-readable and editable. Command-line flags and
//! environment variables override what it contains.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::CoverSize;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Download and output settings
    pub download: DownloadConfig,

    /// Transcoder settings
    pub transcode: TranscodeConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Discogs personal access token (https://www.discogs.com/settings/developers)
    pub discogs_token: Option<String>,

    /// YouTube Data API v3 key
    pub youtube_api_key: Option<String>,
}

/// Download and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Where finished files are written
    pub output_dir: PathBuf,

    /// Scratch directory for raw streams (default: OS temp dir)
    pub scratch_dir: Option<PathBuf>,

    /// Number of tracks processed at once
    pub concurrency: usize,

    /// yt-dlp executable
    pub ytdlp_path: String,

    /// Look up album artwork and embed it
    pub embed_cover: bool,

    /// Artwork size: "small", "medium", "large"
    pub cover_size: CoverSize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            scratch_dir: None,
            concurrency: 4,
            ytdlp_path: "yt-dlp".to_string(),
            embed_cover: true,
            cover_size: CoverSize::Medium,
        }
    }
}

impl DownloadConfig {
    /// Scratch directory, falling back to a subdirectory of the OS temp dir
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("album-fetch"))
    }
}

/// Transcoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// ffmpeg executable
    pub ffmpeg_path: String,

    /// Audio codec passed to `-c:a`
    pub codec: String,

    /// Bitrate passed to `-b:a`
    pub bitrate: String,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Extension of produced files
    pub extension: String,

    /// Output container format passed to `-f`
    pub muxer: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            codec: "libmp3lame".to_string(),
            bitrate: "192k".to_string(),
            sample_rate: 44100,
            extension: "mp3".to_string(),
            muxer: "mp3".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("album-fetch"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to the default location
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, config)
}

/// Save configuration to an explicit path
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
