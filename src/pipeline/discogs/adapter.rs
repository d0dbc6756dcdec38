//! Adapter layer: Convert Discogs DTOs to catalog types
//!
//! This is the ONLY place where Discogs DTO types are converted.

use super::dto;
use crate::pipeline::catalog::{CatalogHit, MasterRelease};

/// Convert search results, keeping Discogs' ordering
pub fn to_hits(response: dto::SearchResponse) -> Vec<CatalogHit> {
    response
        .results
        .into_iter()
        .map(|result| CatalogHit {
            master_ref: result.master_url.or(result.resource_url),
            title: result.title.unwrap_or_default(),
        })
        .collect()
}

/// Convert a master resource
///
/// Headings ("Side A") are dropped. An index track is replaced by its
/// sub-tracks in order, each titled "<work>: <part>"; an index track with
/// no sub-tracks is kept as a single track.
pub fn to_master(response: dto::MasterResponse) -> MasterRelease {
    let mut tracks = Vec::new();
    for entry in response.tracklist {
        match entry.entry_type.as_deref() {
            Some("heading") => {}
            Some("index") if !entry.sub_tracks.is_empty() => {
                let work = entry.title.trim();
                for part in entry.sub_tracks {
                    if part.entry_type.as_deref() == Some("heading") {
                        continue;
                    }
                    tracks.push(if work.is_empty() {
                        part.title
                    } else {
                        format!("{}: {}", work, part.title.trim())
                    });
                }
            }
            _ => tracks.push(entry.title),
        }
    }

    let artists = response
        .artists
        .iter()
        .map(|a| strip_disambiguation(&a.name).to_string())
        .collect();

    MasterRelease {
        title: response.title,
        artists,
        tracks,
    }
}

/// Strip the numeric suffix Discogs adds to tell same-named artists apart
///
/// `"Nirvana (2)"` becomes `"Nirvana"`; `"Sunn O)))"` is left alone.
pub fn strip_disambiguation(name: &str) -> &str {
    let trimmed = name.trim();
    if let Some(rest) = trimmed.strip_suffix(')')
        && let Some(open) = rest.rfind(" (")
    {
        let inner = &rest[open + 2..];
        if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
            return &trimmed[..open];
        }
    }
    trimmed
}
