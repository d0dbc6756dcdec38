//! Pipeline service - orchestrates album and track acquisition
//!
//! This is the high-level API for acquiring music:
//! 1. Resolve the album's tracklist from the catalog (once)
//! 2. Optionally find and stage one cover image (once, best-effort)
//! 3. Per track, concurrently: select a video, fetch its audio, transcode and tag
//!
//! Catalog failures abort an album run. Track failures are recorded in that
//! track's outcome and never stop its siblings. Nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;

use super::artwork::ItunesArtworkClient;
use super::catalog;
use super::discogs::DiscogsClient;
use super::domain::{
    AlbumContext, AlbumReport, CoverImage, PipelineError, StagedCover, Stage, Track,
    TrackListing, TrackOutcome, TrackState, VideoMatch,
};
use super::matcher::{search_query, select_match};
use super::query::sanitize_filename;
use super::stream::StreamFetcher;
use super::traits::{CatalogApi, ImageSearchApi, StreamProvider, Transcoder, VideoSearchApi};
use super::transcode::FfmpegTranscoder;
use super::youtube::YouTubeClient;
use super::ytdlp::YtDlpProvider;
use crate::config::Config;
use crate::error::Error;

/// Runtime settings for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Where tagged files are written
    pub output_dir: PathBuf,
    /// Where raw streams and the staged cover live while in use
    pub scratch_dir: PathBuf,
    /// Maximum number of tracks in flight
    pub concurrency: usize,
    /// Whether to look up and embed album artwork
    pub embed_cover: bool,
    /// Extension of produced files
    pub extension: String,
}

/// External services the pipeline talks to
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogApi>,
    pub search: Arc<dyn VideoSearchApi>,
    pub streams: Arc<dyn StreamProvider>,
    pub transcoder: Arc<dyn Transcoder>,
    pub images: Option<Arc<dyn ImageSearchApi>>,
}

/// Album acquisition pipeline
pub struct Pipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
    fetcher: StreamFetcher,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            fetcher: StreamFetcher::new(settings.scratch_dir.clone()),
            collaborators,
            settings,
        }
    }

    /// Wire up the real clients from configuration.
    ///
    /// Fails when a required credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let token = config
            .credentials
            .discogs_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::config("Discogs token missing: set DISCOGS_TOKEN or [credentials] discogs_token")
            })?;
        let api_key = config
            .credentials
            .youtube_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::config(
                    "YouTube API key missing: set YOUTUBE_API_KEY or [credentials] youtube_api_key",
                )
            })?;

        let download = &config.download;
        let transcoder = FfmpegTranscoder::new(config.transcode.clone());
        let settings = PipelineSettings {
            output_dir: download.output_dir.clone(),
            scratch_dir: download.scratch_dir(),
            concurrency: download.concurrency,
            embed_cover: download.embed_cover,
            extension: transcoder.extension().to_string(),
        };

        let images: Option<Arc<dyn ImageSearchApi>> = if download.embed_cover {
            Some(Arc::new(ItunesArtworkClient::new(download.cover_size)))
        } else {
            None
        };

        let collaborators = Collaborators {
            catalog: Arc::new(DiscogsClient::new(token)),
            search: Arc::new(YouTubeClient::new(api_key)),
            streams: Arc::new(YtDlpProvider::new(download.ytdlp_path.clone())),
            transcoder: Arc::new(transcoder),
            images,
        };

        Ok(Self::new(collaborators, settings))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Resolve an album query to its tracklist, artist and title
    pub async fn resolve_tracklist(&self, query: &str) -> Result<TrackListing, PipelineError> {
        let listing = catalog::resolve(self.collaborators.catalog.as_ref(), query).await?;
        tracing::info!(
            "Resolved \"{}\" by {} ({} tracks)",
            listing.album_title,
            listing.artist,
            listing.tracks.len()
        );
        Ok(listing)
    }

    /// Acquire every track of an album.
    ///
    /// Returns an error only when the album itself cannot be resolved (or
    /// the output directory cannot be created). Otherwise every track gets
    /// an outcome, in listing order.
    pub async fn run_album(&self, query: &str) -> Result<AlbumReport, PipelineError> {
        let listing = self.resolve_tracklist(query).await?;
        self.ensure_output_dir().await?;

        let cover = match self.resolve_cover(&listing.artist, &listing.album_title).await {
            Some(image) => self.stage_cover_best_effort(image).await,
            None => None,
        };
        let ctx = AlbumContext::new(&listing.artist, &listing.album_title).with_cover(cover);

        let concurrency = self.settings.concurrency.max(1);
        tracing::info!(
            "Acquiring {} tracks ({} at a time)",
            listing.tracks.len(),
            concurrency
        );

        let mut outcomes: Vec<TrackOutcome> =
            futures::stream::iter(listing.tracks.iter().enumerate())
                .map(|(index, track)| self.run_track(&ctx, index, track))
                .buffer_unordered(concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|o| o.index);

        Ok(AlbumReport { listing, outcomes })
    }

    /// Run one track of an album to a terminal state
    pub async fn run_track(&self, ctx: &AlbumContext, index: usize, track: &Track) -> TrackOutcome {
        let output = self.album_output_path(index, track);
        let state = self.drive(ctx, track, &output).await;
        TrackOutcome {
            index,
            title: track.title.clone(),
            state,
        }
    }

    /// Acquire a single track outside of an album run.
    ///
    /// Writes `<title>.<ext>` into the output directory and returns its path.
    pub async fn acquire_track(
        &self,
        title: &str,
        artist: &str,
        album: &str,
        cover: Option<CoverImage>,
    ) -> Result<PathBuf, PipelineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PipelineError::InvalidInput("track title is empty".to_string()));
        }
        self.ensure_output_dir().await?;

        let cover = match cover {
            Some(image) => self.stage_cover_best_effort(image).await,
            None => None,
        };
        let ctx = AlbumContext::new(artist.trim(), album.trim()).with_cover(cover);
        let track = Track::new(title);
        let output = self
            .settings
            .output_dir
            .join(format!("{}.{}", sanitize_filename(title), self.settings.extension));

        match self.drive(&ctx, &track, &output).await {
            TrackState::Delivered(file) => Ok(file.path),
            TrackState::Failed { error, .. } => Err(error),
            other => Err(PipelineError::IoFailure(format!(
                "track stopped in {} state",
                other.name()
            ))),
        }
    }

    /// Output location of a track within an album run.
    ///
    /// The position prefix keeps repeated titles apart.
    pub fn album_output_path(&self, index: usize, track: &Track) -> PathBuf {
        self.settings.output_dir.join(format!(
            "{:02} - {}.{}",
            index + 1,
            sanitize_filename(&track.title),
            self.settings.extension
        ))
    }

    /// Step a track from `Pending` until it is delivered or failed
    async fn drive(&self, ctx: &AlbumContext, track: &Track, output: &Path) -> TrackState {
        let mut state = TrackState::Pending;
        while !state.is_terminal() {
            let from = state.name();
            state = self.advance(ctx, track, output, state).await;
            tracing::debug!("\"{}\": {} -> {}", track.title, from, state.name());
        }

        match &state {
            TrackState::Delivered(file) => {
                tracing::info!("Delivered \"{}\" to {}", track.title, file.path.display())
            }
            TrackState::Failed { stage, error } => {
                tracing::warn!("\"{}\" failed at {} stage: {}", track.title, stage, error)
            }
            _ => {}
        }
        state
    }

    /// Run the stage that follows `state`
    async fn advance(
        &self,
        ctx: &AlbumContext,
        track: &Track,
        output: &Path,
        state: TrackState,
    ) -> TrackState {
        let Some(stage) = state.next_stage() else {
            return match state {
                TrackState::Transcoded(file) => TrackState::Delivered(file),
                other => other,
            };
        };

        let result = match state {
            TrackState::Pending => self.match_track(ctx, track).await.map(TrackState::Matched),
            TrackState::Matched(video) => self
                .fetcher
                .fetch_audio(self.collaborators.streams.as_ref(), &video)
                .await
                .map(TrackState::Fetched),
            TrackState::Fetched(artifact) => self
                .collaborators
                .transcoder
                .transcode(artifact, output, &ctx.tags_for(track), ctx.cover_path())
                .await
                .map(TrackState::Transcoded),
            other => Ok(other),
        };

        result.unwrap_or_else(|error| TrackState::Failed { stage, error })
    }

    async fn match_track(&self, ctx: &AlbumContext, track: &Track) -> Result<VideoMatch, PipelineError> {
        select_match(self.collaborators.search.as_ref(), track, &ctx.artist)
            .await?
            .ok_or_else(|| PipelineError::NoMatch(search_query(&track.title, &ctx.artist)))
    }

    async fn ensure_output_dir(&self) -> Result<(), PipelineError> {
        let dir = &self.settings.output_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PipelineError::io(format!("failed to create {}", dir.display()), e))
    }

    /// Look up album artwork. Any failure is logged and treated as no cover.
    async fn resolve_cover(&self, artist: &str, album_title: &str) -> Option<CoverImage> {
        if !self.settings.embed_cover {
            return None;
        }
        let images = self.collaborators.images.as_ref()?;

        let query = search_query(album_title, artist);
        if query.is_empty() {
            return None;
        }

        match images.find_cover(&query).await {
            Ok(Some(image)) => {
                tracing::info!("Found cover art ({} bytes) at {}", image.data.len(), image.url);
                Some(image)
            }
            Ok(None) => {
                tracing::info!("No cover art found for \"{}\"", query);
                None
            }
            Err(e) => {
                tracing::warn!("Cover art lookup failed, continuing without: {}", e);
                None
            }
        }
    }

    async fn stage_cover_best_effort(&self, image: CoverImage) -> Option<Arc<StagedCover>> {
        match self.stage_cover(image).await {
            Ok(staged) => Some(Arc::new(staged)),
            Err(e) => {
                tracing::warn!("Could not stage cover art, continuing without: {}", e);
                None
            }
        }
    }

    /// Write a cover image into scratch storage for the transcoder to read
    async fn stage_cover(&self, image: CoverImage) -> Result<StagedCover, PipelineError> {
        let dir = self.fetcher.scratch_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PipelineError::io(format!("failed to create {}", dir.display()), e))?;

        let path = tempfile::Builder::new()
            .prefix("cover-")
            .suffix(&format!(".{}", image.extension()))
            .tempfile_in(dir)
            .map(|f| f.into_temp_path())
            .map_err(|e| PipelineError::io("failed to create cover file", e))?;

        tokio::fs::write(&path, &image.data)
            .await
            .map_err(|e| PipelineError::io(format!("failed to write {}", path.display()), e))?;

        Ok(StagedCover::new(image, path))
    }
}

/// One-line description of a failed track
pub fn describe_failure(stage: Stage, error: &PipelineError) -> String {
    format!("{stage}: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::mocks::{MockCatalog, MockImageSearch, MockTranscoder, MockVideoSearch};
    use crate::test_utils::{MockPipeline, THRILLER_TRACKS};

    fn scratch_is_empty(mock: &MockPipeline) -> bool {
        match std::fs::read_dir(mock.scratch_dir()) {
            Ok(entries) => entries.count() == 0,
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_thriller_album_run() {
        let mock = MockPipeline::thriller();
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        assert_eq!(report.listing.artist, "Michael Jackson");
        assert_eq!(report.listing.album_title, "Thriller");
        assert_eq!(report.outcomes.len(), 9);
        assert_eq!(report.delivered_count(), 9);
        assert_eq!(report.failed_count(), 0);

        let titles: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, THRILLER_TRACKS);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.index, i);
        }

        let billie = report.outcomes[5].file().unwrap();
        assert_eq!(billie.tags.title, "Billie Jean");
        assert_eq!(billie.tags.artist, "Michael Jackson");
        assert_eq!(billie.tags.album, "Thriller");
        assert_eq!(billie.path, mock.output_dir().join("06 - Billie Jean.mp3"));
        assert!(billie.path.exists());
        assert!(!billie.has_cover);

        assert_eq!(
            mock.search.queries().len(),
            9,
            "one video search per track"
        );
    }

    #[tokio::test]
    async fn test_scratch_artifacts_removed_after_run() {
        let mock = MockPipeline::thriller()
            .with_transcoder(MockTranscoder::new().failing_for("Human Nature"));
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        assert_eq!(report.outcomes.len(), 9);
        let calls = mock.transcoder.calls();
        assert_eq!(calls.len(), 9);
        for call in &calls {
            assert!(call.artifact_existed);
            assert!(call.artifact.starts_with(mock.scratch_dir()));
            assert!(!call.artifact.exists());
        }
        assert!(scratch_is_empty(&mock));
    }

    #[tokio::test]
    async fn test_no_search_results_aborts_album() {
        let mock = MockPipeline::thriller().with_catalog(MockCatalog::no_results());
        let pipeline = mock.build();

        let result = pipeline.run_album("Nonexistent Album").await;

        assert_eq!(
            result.unwrap_err(),
            PipelineError::NoSearchResults("Nonexistent Album".to_string())
        );
        assert_eq!(mock.catalog.fetch_calls(), 0);
        assert!(mock.search.queries().is_empty());
        assert!(mock.transcoder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_fails_before_network() {
        let mock = MockPipeline::thriller();
        let pipeline = mock.build();

        let result = pipeline.resolve_tracklist(" %20 + ").await;

        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
        assert_eq!(mock.catalog.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_catalog_upstream_error_aborts_album() {
        let mock = MockPipeline::thriller().with_catalog(MockCatalog::with_error(
            PipelineError::upstream("catalog", Some(401), "Unauthorized"),
        ));

        let result = mock.build().run_album("Thriller").await;

        assert!(matches!(result, Err(PipelineError::Upstream { status: Some(401), .. })));
    }

    #[tokio::test]
    async fn test_no_match_is_isolated() {
        let mock = MockPipeline::thriller()
            .with_search(MockVideoSearch::new().without_match_for("Beat It"));
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        assert_eq!(report.delivered_count(), 8);
        let beat_it = &report.outcomes[4];
        assert_eq!(beat_it.title, "Beat It");
        let (stage, error) = beat_it.failure().unwrap();
        assert_eq!(stage, Stage::Match);
        assert_eq!(
            *error,
            PipelineError::NoMatch("Beat It Michael Jackson".to_string())
        );
    }

    #[tokio::test]
    async fn test_transcode_failure_is_isolated() {
        let mock = MockPipeline::thriller()
            .with_transcoder(MockTranscoder::new().failing_for("Human Nature"));
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        let human_nature = &report.outcomes[6];
        assert_eq!(human_nature.title, "Human Nature");
        let (stage, error) = human_nature.failure().unwrap();
        assert_eq!(stage, Stage::Transcode);
        assert!(matches!(error, PipelineError::TranscodeFailed(_)));
        assert!(!mock.output_dir().join("07 - Human Nature.mp3").exists());
        assert_eq!(report.delivered_count(), 8);
        assert!(scratch_is_empty(&mock));
    }

    #[tokio::test]
    async fn test_stream_failure_attributed_to_fetch() {
        let mock = MockPipeline::thriller()
            .with_stream_unavailable("Billie_Jean_Michael_Jackson");
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        assert_eq!(report.outcomes[5].title, "Billie Jean");
        let (stage, error) = report.outcomes[5].failure().unwrap();
        assert_eq!(stage, Stage::Fetch);
        assert!(matches!(error, PipelineError::StreamUnavailable(_)));
        assert_eq!(report.delivered_count(), 8);
    }

    #[tokio::test]
    async fn test_duplicate_titles_do_not_collide() {
        let mock = MockPipeline::thriller()
            .with_catalog(MockCatalog::album(
                "Live",
                "Band",
                &["Intro", "Intro", "Outro", "Intro"],
            ))
            .with_search(MockVideoSearch::always("same-video"));
        let pipeline = mock.build();

        let report = pipeline.run_album("Live").await.unwrap();

        assert_eq!(report.delivered_count(), 4);
        let mut paths: Vec<PathBuf> = report
            .outcomes
            .iter()
            .map(|o| o.file().unwrap().path.clone())
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);

        // All four tracks fetched the same video into separate scratch files
        let mut artifacts: Vec<PathBuf> =
            mock.transcoder.calls().into_iter().map(|c| c.artifact).collect();
        artifacts.sort();
        artifacts.dedup();
        assert_eq!(artifacts.len(), 4);
    }

    #[tokio::test]
    async fn test_cover_staged_once_and_shared() {
        let mock = MockPipeline::thriller().with_images(MockImageSearch::with_placeholder());
        let pipeline = mock.build();

        let report = pipeline.run_album("Thriller").await.unwrap();

        let images = mock.images.as_ref().unwrap();
        assert_eq!(
            *images.queries.lock().unwrap(),
            vec!["Thriller Michael Jackson".to_string()]
        );

        let covers: Vec<Option<PathBuf>> =
            mock.transcoder.calls().into_iter().map(|c| c.cover).collect();
        assert_eq!(covers.len(), 9);
        let first = covers[0].clone().unwrap();
        assert!(covers.iter().all(|c| c.as_ref() == Some(&first)));
        assert!(report.outcomes.iter().all(|o| o.file().unwrap().has_cover));

        // Removed once the run is over
        assert!(!first.exists());
        assert!(scratch_is_empty(&mock));
    }

    #[tokio::test]
    async fn test_cover_failure_is_not_fatal() {
        let mock = MockPipeline::thriller().with_images(MockImageSearch::with_error(
            PipelineError::upstream("images", Some(500), "Internal Server Error"),
        ));

        let report = mock.build().run_album("Thriller").await.unwrap();

        assert_eq!(report.delivered_count(), 9);
        assert!(mock.transcoder.calls().iter().all(|c| c.cover.is_none()));
    }

    #[tokio::test]
    async fn test_cover_skipped_when_disabled() {
        let mock = MockPipeline::thriller().with_images(MockImageSearch::with_placeholder());
        let mut pipeline = mock.build();
        pipeline.settings.embed_cover = false;

        pipeline.run_album("Thriller").await.unwrap();

        assert!(mock.images.as_ref().unwrap().queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sequential_run_matches_concurrent_order() {
        let mock = MockPipeline::thriller();
        let mut pipeline = mock.build();
        pipeline.settings.concurrency = 1;

        let report = pipeline.run_album("Thriller").await.unwrap();

        let titles: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, THRILLER_TRACKS);
    }

    #[tokio::test]
    async fn test_acquire_track() {
        let mock = MockPipeline::thriller();
        let pipeline = mock.build();

        let path = pipeline
            .acquire_track(" Billie Jean ", "Michael Jackson", "Thriller", None)
            .await
            .unwrap();

        assert_eq!(path, mock.output_dir().join("Billie Jean.mp3"));
        assert!(path.exists());
        let calls = mock.transcoder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tags.album, "Thriller");
        assert_eq!(calls[0].cover, None);
        assert!(scratch_is_empty(&mock));
    }

    #[tokio::test]
    async fn test_acquire_track_with_cover() {
        let mock = MockPipeline::thriller();
        let pipeline = mock.build();
        let cover = CoverImage {
            data: vec![0x89, b'P', b'N', b'G'],
            mime_type: "image/png".to_string(),
            url: "https://images.example.com/cover.png".to_string(),
        };

        pipeline
            .acquire_track("Thriller", "Michael Jackson", "Thriller", Some(cover))
            .await
            .unwrap();

        let calls = mock.transcoder.calls();
        let cover_path = calls[0].cover.clone().unwrap();
        assert_eq!(cover_path.extension().unwrap(), "png");
        assert!(!cover_path.exists());
    }

    #[tokio::test]
    async fn test_acquire_track_errors() {
        let mock = MockPipeline::thriller()
            .with_search(MockVideoSearch::new().without_match_for("Obscure"));
        let pipeline = mock.build();

        let result = pipeline.acquire_track("   ", "Artist", "", None).await;
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));

        let result = pipeline
            .acquire_track("Obscure B-Side", "Artist", "", None)
            .await;
        assert!(matches!(result, Err(PipelineError::NoMatch(_))));
    }

    #[test]
    fn test_album_output_path() {
        let mock = MockPipeline::thriller();
        let pipeline = mock.build();

        let path = pipeline.album_output_path(0, &Track::new("P.Y.T. (Pretty Young Thing)"));
        assert_eq!(
            path,
            mock.output_dir().join("01 - P.Y.T. (Pretty Young Thing).mp3")
        );

        let path = pipeline.album_output_path(11, &Track::new("AC/DC: Live?"));
        assert_eq!(path, mock.output_dir().join("12 - AC_DC_ Live_.mp3"));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = Config::default();
        assert!(matches!(Pipeline::from_config(&config), Err(Error::Config(_))));

        config.credentials.discogs_token = Some("token".to_string());
        assert!(matches!(Pipeline::from_config(&config), Err(Error::Config(_))));

        config.credentials.youtube_api_key = Some("key".to_string());
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.settings().extension, "mp3");
        assert_eq!(pipeline.settings().concurrency, 4);
    }

    #[test]
    fn test_describe_failure() {
        let text = describe_failure(Stage::Match, &PipelineError::NoMatch("x".to_string()));
        assert_eq!(text, "match: No video found for \"x\"");
    }
}
