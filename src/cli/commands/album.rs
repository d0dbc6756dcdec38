//! Album and track acquisition commands.

use std::io::Write;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::ResultExt;
use crate::pipeline::{AlbumReport, Pipeline, PipelineError, describe_failure};

use super::until_interrupted;

/// Download every track of an album
pub fn cmd_album(rt: &Runtime, config: &Config, query: &str) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    rt.block_on(async {
        println!("Looking up: {}", query.trim());
        println!();

        let Some(result) = until_interrupted(pipeline.run_album(query)).await else {
            anyhow::bail!("interrupted");
        };

        match result {
            Ok(report) => {
                print_report(&report);
                Ok(())
            }
            Err(e @ (PipelineError::NoSearchResults(_) | PipelineError::NoTracksFound)) => {
                println!("✗ {}", e);
                anyhow::bail!("no songs found for \"{}\"", query.trim())
            }
            Err(e) => Err(e.into()),
        }
    })
}

/// Show an album's tracklist
pub fn cmd_tracklist(rt: &Runtime, config: &Config, query: &str) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    rt.block_on(async {
        let Some(result) = until_interrupted(pipeline.resolve_tracklist(query)).await else {
            anyhow::bail!("interrupted");
        };
        let listing = result.with_context("Could not resolve tracklist")?;

        println!("  Artist: {}", listing.artist);
        println!("  Album:  {}", listing.album_title);
        println!();
        for (i, track) in listing.tracks.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, track.title);
        }
        Ok(())
    })
}

/// Download a single track
pub fn cmd_track(
    rt: &Runtime,
    config: &Config,
    title: &str,
    artist: &str,
    album: &str,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    rt.block_on(async {
        let acquire = pipeline.acquire_track(title, artist, album, None);
        let Some(result) = until_interrupted(acquire).await else {
            anyhow::bail!("interrupted");
        };

        let path = result.with_context(format!("Could not acquire \"{}\"", title.trim()))?;
        println!("✓ {}", path.display());
        Ok(())
    })
}

/// Prompt for an album name on stdin.
///
/// Returns `None` for an empty answer or end of input.
pub fn prompt_album() -> anyhow::Result<Option<String>> {
    print!("Enter album name: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }

    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

/// Print the per-track summary of an album run
fn print_report(report: &AlbumReport) {
    println!(
        "{} - {} ({} tracks)",
        report.listing.artist,
        report.listing.album_title,
        report.listing.tracks.len()
    );
    println!();

    for outcome in &report.outcomes {
        if let Some(file) = outcome.file() {
            println!("  ✓ {:>2}. {}", outcome.index + 1, file.path.display());
        } else if let Some((stage, error)) = outcome.failure() {
            println!(
                "  ✗ {:>2}. {} ({})",
                outcome.index + 1,
                outcome.title,
                describe_failure(stage, error)
            );
        }
    }

    println!();
    println!(
        "Done: {} delivered, {} failed.",
        report.delivered_count(),
        report.failed_count()
    );
}
