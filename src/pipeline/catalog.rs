//! Catalog resolution: album name to tracklist, artist and album title.
//!
//! The first search hit wins. There is no ranking or disambiguation beyond
//! the catalog's own ordering, so a popular reissue or a same-named album by
//! another artist can shadow the intended release. That is a known
//! limitation of the policy, kept so results stay reproducible.

use super::domain::{PipelineError, Track, TrackListing};
use super::query::normalize_query;
use super::traits::CatalogApi;

/// One catalog search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHit {
    /// Reference to the master resource (absent for some result types)
    pub master_ref: Option<String>,
    /// Display title as the catalog lists it
    pub title: String,
}

/// Master resource, already reduced to what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRelease {
    pub title: String,
    /// Artist names in credit order
    pub artists: Vec<String>,
    /// Track titles in listed order
    pub tracks: Vec<String>,
}

/// Resolve an album query to its tracklist.
///
/// The query is validated before any network call. An empty search result
/// stops here without fetching a master resource.
pub async fn resolve(api: &dyn CatalogApi, album: &str) -> Result<TrackListing, PipelineError> {
    let query = normalize_query(album)?;

    let hits = api.search(&query).await?;
    let Some(first) = hits.into_iter().next() else {
        return Err(PipelineError::NoSearchResults(query));
    };

    let master_ref = first.master_ref.ok_or_else(|| {
        PipelineError::upstream(
            "catalog",
            None,
            format!("first result \"{}\" has no master reference", first.title),
        )
    })?;

    tracing::debug!("Catalog hit \"{}\" -> {}", first.title, master_ref);
    let master = api.fetch_master(&master_ref).await?;

    to_listing(master)
}

fn to_listing(master: MasterRelease) -> Result<TrackListing, PipelineError> {
    let tracks: Vec<Track> = master
        .tracks
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(Track::new)
        .collect();

    if tracks.is_empty() {
        return Err(PipelineError::NoTracksFound);
    }

    let artist = master.artists.into_iter().next().unwrap_or_default();
    if artist.is_empty() {
        tracing::warn!("Master \"{}\" lists no artist", master.title);
    }

    Ok(TrackListing {
        tracks,
        artist,
        album_title: master.title.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::mocks::MockCatalog;
    use crate::test_utils::THRILLER_TRACKS;

    #[tokio::test]
    async fn test_resolve_keeps_count_and_order() {
        let catalog = MockCatalog::album("Thriller", "Michael Jackson", THRILLER_TRACKS);

        let listing = resolve(&catalog, "Thriller").await.unwrap();

        assert_eq!(listing.tracks.len(), 9);
        assert_eq!(listing.artist, "Michael Jackson");
        assert_eq!(listing.album_title, "Thriller");
        let titles: Vec<_> = listing.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, THRILLER_TRACKS);
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_network_call() {
        let catalog = MockCatalog::album("Thriller", "Michael Jackson", THRILLER_TRACKS);

        for input in ["", "   ", "+%20"] {
            let result = resolve(&catalog, input).await;
            assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
        }
        assert_eq!(catalog.search_calls(), 0);
        assert_eq!(catalog.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_results_skips_master_fetch() {
        let catalog = MockCatalog::no_results();

        let result = resolve(&catalog, "zzzz no such album").await;

        assert_eq!(
            result,
            Err(PipelineError::NoSearchResults("zzzz no such album".to_string()))
        );
        assert_eq!(catalog.search_calls(), 1);
        assert_eq!(catalog.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_tracklist_is_no_tracks_found() {
        let catalog = MockCatalog::album("Silence", "Nobody", &["  ", ""]);

        let result = resolve(&catalog, "Silence").await;

        assert_eq!(result, Err(PipelineError::NoTracksFound));
    }

    #[tokio::test]
    async fn test_search_error_is_surfaced() {
        let catalog =
            MockCatalog::with_error(PipelineError::upstream("catalog", Some(401), "Unauthorized"));

        let result = resolve(&catalog, "Thriller").await;

        assert!(matches!(result, Err(PipelineError::Upstream { status: Some(401), .. })));
        assert_eq!(catalog.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_hit_without_master_reference() {
        let mut catalog = MockCatalog::album("Thriller", "Michael Jackson", THRILLER_TRACKS);
        catalog.hits[0].master_ref = None;

        let result = resolve(&catalog, "Thriller").await;

        assert!(matches!(result, Err(PipelineError::Upstream { .. })));
        assert_eq!(catalog.fetch_calls(), 0);
    }

    #[test]
    fn test_missing_artist_is_empty() {
        let listing = to_listing(MasterRelease {
            title: "Untitled".to_string(),
            artists: vec![],
            tracks: vec!["One".to_string()],
        })
        .unwrap();
        assert_eq!(listing.artist, "");
    }
}
