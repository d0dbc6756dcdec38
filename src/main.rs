//! Album Fetch - turn an album name into a folder of tagged audio files.
//!
//! The album's tracklist comes from Discogs, each track is matched to a
//! YouTube video, the audio stream is pulled with yt-dlp and transcoded and
//! tagged with ffmpeg. Run with a subcommand, or without one to be prompted
//! for an album name.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tags;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("album_fetch=info".parse()?))
        .init();

    // Try to run a CLI command
    if cli::run_command(&args)? {
        return Ok(());
    }

    // No command specified, ask for an album
    cli::run_interactive(&args)
}
