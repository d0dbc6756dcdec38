//! Match selection: one video per track.
//!
//! The selector asks the search service for a single result and takes it as
//! is. There is no secondary scoring, so a cover version or live cut that
//! outranks the studio recording will be picked. Known limitation, kept for
//! reproducibility.

use super::domain::{PipelineError, Track, VideoMatch};
use super::traits::VideoSearchApi;

/// Build the search string for a track: `"<title> <artist>"`.
pub fn search_query(title: &str, artist: &str) -> String {
    let title = title.trim();
    let artist = artist.trim();
    if artist.is_empty() {
        title.to_string()
    } else {
        format!("{title} {artist}")
    }
}

/// Select the best video for a track.
///
/// `Ok(None)` means the search ran and found nothing. Transport failures
/// are errors.
pub async fn select_match(
    api: &dyn VideoSearchApi,
    track: &Track,
    artist: &str,
) -> Result<Option<VideoMatch>, PipelineError> {
    let query = search_query(&track.title, artist);
    let ids = api.search(&query, 1).await?;
    Ok(ids.into_iter().next().map(VideoMatch))
}
