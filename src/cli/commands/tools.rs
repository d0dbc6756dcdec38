//! External tool checks, config setup and tag inspection commands.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::error::ResultExt;
use crate::pipeline::{FfmpegTranscoder, YtDlpProvider};
use crate::tags;

use super::print_tool_install_instructions;

/// Check if the external tools are installed
pub fn cmd_check_tools(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    println!("Checking acquisition tools...\n");

    let transcoder = FfmpegTranscoder::new(config.transcode.clone());
    let provider = YtDlpProvider::new(config.download.ytdlp_path.clone());
    let (ffmpeg, ytdlp) = rt.block_on(async { tokio::join!(transcoder.version(), provider.version()) });

    let mut missing = false;
    match ffmpeg {
        Some(version) => println!("✓ ffmpeg: {}", version),
        None => {
            println!("✗ ffmpeg: NOT FOUND ({})", config.transcode.ffmpeg_path);
            missing = true;
        }
    }
    match ytdlp {
        Some(version) => println!("✓ yt-dlp: {}", version),
        None => {
            println!("✗ yt-dlp: NOT FOUND ({})", config.download.ytdlp_path);
            missing = true;
        }
    }
    if missing {
        print_tool_install_instructions();
    }

    println!();
    println!("API Keys:");
    let credentials = &config.credentials;
    for (name, value) in [
        ("DISCOGS_TOKEN", &credentials.discogs_token),
        ("YOUTUBE_API_KEY", &credentials.youtube_api_key),
    ] {
        if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            println!("✓ {}: set", name);
        } else {
            println!("✗ {}: not set", name);
        }
    }

    Ok(())
}

/// Write the effective configuration to disk
///
/// Goes to `path` when given, otherwise to the default config location.
/// An existing file is only replaced with `force`.
pub fn cmd_init_config(path: Option<&Path>, config: &Config, force: bool) -> anyhow::Result<()> {
    let written = write_config(path, config, force)?;
    println!("✓ Wrote {}", written.display());
    if config.credentials.discogs_token.is_some() || config.credentials.youtube_api_key.is_some() {
        println!("  (includes API credentials)");
    }
    Ok(())
}

fn write_config(path: Option<&Path>, config: &Config, force: bool) -> anyhow::Result<PathBuf> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path().ok_or(config::ConfigError::NoConfigDir)?,
    };
    if target.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", target.display());
    }

    match path {
        Some(p) => config::save_to(p, config)?,
        None => config::save(config)?,
    }
    Ok(target)
}

/// Show the tags of an audio file
pub fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let read = tags::read(path).with_context("Could not read tags")?;

    println!("File: {}", path.display());
    println!("  Title:  {}", read.tags.title);
    println!("  Artist: {}", read.tags.artist);
    println!("  Album:  {}", read.tags.album);
    println!("  Cover:  {}", if read.has_cover { "yes" } else { "no" });
    println!("  Length: {}:{:02}", read.duration / 60, read.duration % 60);

    Ok(())
}
