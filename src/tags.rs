//! Tag read-back for produced audio files.
//!
//! Uses the lofty crate for format-independent metadata access, so a file
//! written by the transcoder can be checked without shelling out again.

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pipeline::TagSet;

/// Tags as found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTags {
    pub tags: TagSet,
    /// Whether at least one embedded picture is present
    pub has_cover: bool,
    /// Duration in seconds
    pub duration: u64,
}

pub fn read(path: &Path) -> Result<ReadTags> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }

    let tagged_file = Probe::open(path)
        .map_err(|e| Error::tags(path, e.to_string()))?
        .read()
        .map_err(|e| Error::tags(path, e.to_string()))?;

    // Primary tag first, then whatever the file carries
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let field = |value: Option<std::borrow::Cow<'_, str>>| {
        value.map(|s| s.to_string()).unwrap_or_default()
    };

    let tags = TagSet {
        title: field(tag.and_then(|t| t.title())),
        artist: field(tag.and_then(|t| t.artist())),
        album: field(tag.and_then(|t| t.album())),
    };
    let has_cover = tag.is_some_and(|t| !t.pictures().is_empty());
    let duration = tagged_file.properties().duration().as_secs();

    Ok(ReadTags {
        tags,
        has_cover,
        duration,
    })
}
