//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `album`: album runs, tracklist lookup, single-track acquisition
//! - `tools`: external tool checks, config setup and tag inspection

mod album;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use album::{cmd_album, cmd_track, cmd_tracklist, prompt_album};
pub use tools::{cmd_check_tools, cmd_init_config, cmd_inspect};

/// Album Fetch CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for finished files
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Number of tracks processed at once
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,

    /// Don't look up or embed album artwork
    #[arg(long, global = true)]
    pub no_cover: bool,

    /// Discogs token (or set DISCOGS_TOKEN env var)
    #[arg(long, env = "DISCOGS_TOKEN", global = true, hide_env_values = true)]
    pub discogs_token: Option<String>,

    /// YouTube Data API key (or set YOUTUBE_API_KEY env var)
    #[arg(long, env = "YOUTUBE_API_KEY", global = true, hide_env_values = true)]
    pub youtube_api_key: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download, transcode and tag every track of an album
    Album {
        /// Album name
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show an album's tracklist without downloading anything
    Tracklist {
        /// Album name
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Download a single track
    Track {
        /// Track title
        #[arg(long)]
        title: String,
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Album name written into the tags
        #[arg(long)]
        album: Option<String>,
    },
    /// Show the tags of a produced file
    Inspect {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Check if ffmpeg and yt-dlp are installed
    CheckTools,
    /// Write the current settings (including flag overrides) to the config file
    InitConfig {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was
/// specified (meaning the interactive prompt should run).
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    let rt = Runtime::new()?;
    let config = load_config(cli)?;

    match command {
        Commands::Album { query } => cmd_album(&rt, &config, &query.join(" "))?,
        Commands::Tracklist { query } => cmd_tracklist(&rt, &config, &query.join(" "))?,
        Commands::Track {
            title,
            artist,
            album,
        } => cmd_track(&rt, &config, title, artist, album.as_deref().unwrap_or_default())?,
        Commands::Inspect { path } => cmd_inspect(path)?,
        Commands::CheckTools => cmd_check_tools(&rt, &config)?,
        Commands::InitConfig { force } => cmd_init_config(cli.config.as_deref(), &config, *force)?,
    }
    Ok(true)
}

/// Ask for an album name and run it.
pub fn run_interactive(cli: &Cli) -> anyhow::Result<()> {
    let Some(query) = prompt_album()? else {
        println!("No album name given.");
        return Ok(());
    };

    let rt = Runtime::new()?;
    let config = load_config(cli)?;
    cmd_album(&rt, &config, &query)
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        // init-config may be creating the file
        Some(path) if !path.exists() && matches!(cli.command, Some(Commands::InitConfig { .. })) => {
            Config::default()
        }
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(dir) = &cli.output_dir {
        config.download.output_dir = dir.clone();
    }
    if let Some(n) = cli.concurrency {
        config.download.concurrency = n;
    }
    if cli.no_cover {
        config.download.embed_cover = false;
    }
    if let Some(token) = &cli.discogs_token {
        config.credentials.discogs_token = Some(token.clone());
    }
    if let Some(key) = &cli.youtube_api_key {
        config.credentials.youtube_api_key = Some(key.clone());
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Run a future until it completes or Ctrl-C is pressed.
///
/// On interrupt the future is dropped, which kills any running yt-dlp or
/// ffmpeg process and removes scratch and partial files.
pub(crate) async fn until_interrupted<F: std::future::Future>(future: F) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted, cleaning up...");
            None
        }
    }
}

/// Print installation instructions for the external tools
pub(crate) fn print_tool_install_instructions() {
    eprintln!("Install ffmpeg:");
    eprintln!("  Windows: winget install Gyan.FFmpeg");
    eprintln!("  macOS:   brew install ffmpeg");
    eprintln!("  Linux:   apt install ffmpeg");
    eprintln!("Install yt-dlp:");
    eprintln!("  Windows: winget install yt-dlp");
    eprintln!("  macOS:   brew install yt-dlp");
    eprintln!("  Linux:   pipx install yt-dlp");
}
