//! Transcoding and tagging via the `ffmpeg` command-line tool.
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::domain::{AudioArtifact, PipelineError, TagSet, TaggedAudioFile};
use crate::config::TranscodeConfig;

/// Transcoder that shells out to ffmpeg
pub struct FfmpegTranscoder {
    settings: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(settings: TranscodeConfig) -> Self {
        Self { settings }
    }

    /// Extension of the files this transcoder produces
    pub fn extension(&self) -> &str {
        &self.settings.extension
    }

    /// Build the ffmpeg argument list
    ///
    /// A cover is muxed as an attached picture with `-c:v copy`, never
    /// re-encoded.
    pub fn build_args(
        &self,
        input: &Path,
        cover: Option<&Path>,
        tags: &TagSet,
        output: &Path,
    ) -> Vec<OsString> {
        let s = &self.settings;
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-i"]
            .map(OsString::from)
            .into();
        args.push(OsString::from(input));
        if let Some(cover) = cover {
            args.push(OsString::from("-i"));
            args.push(OsString::from(cover));
        }

        let mut flags: Vec<String> = vec!["-map".into(), "0:a".into()];
        if cover.is_some() {
            for flag in [
                "-map",
                "1:v",
                "-c:v",
                "copy",
                "-disposition:v",
                "attached_pic",
                "-metadata:s:v",
                "title=Album cover",
                "-metadata:s:v",
                "comment=Cover (front)",
            ] {
                flags.push(flag.to_string());
            }
        } else {
            flags.push("-vn".into());
        }

        flags.extend(["-c:a".to_string(), s.codec.clone()]);
        flags.extend(["-b:a".to_string(), s.bitrate.clone()]);
        flags.extend(["-ar".to_string(), s.sample_rate.to_string()]);
        if s.muxer == "mp3" {
            flags.extend(["-id3v2_version".to_string(), "3".to_string()]);
        }

        for (key, value) in [("title", &tags.title), ("artist", &tags.artist), ("album", &tags.album)] {
            flags.push("-metadata".to_string());
            flags.push(format!("{key}={value}"));
        }

        // The partial output has no meaningful extension, so name the muxer
        flags.extend(["-f".to_string(), s.muxer.clone()]);

        args.extend(flags.into_iter().map(OsString::from));
        args.push(OsString::from(output));
        args
    }

    /// Transcode an artifact into a tagged file at `output`.
    ///
    /// ffmpeg writes into a hidden partial file beside `output` that is only
    /// renamed into place after a zero exit. The artifact is consumed and
    /// its scratch file deleted whatever the outcome. If the returned future
    /// is dropped mid-run, ffmpeg is killed and both files are removed.
    pub async fn transcode(
        &self,
        artifact: AudioArtifact,
        output: &Path,
        tags: &TagSet,
        cover: Option<&Path>,
    ) -> Result<TaggedAudioFile, PipelineError> {
        let dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::io(format!("failed to create {}", dir.display()), e))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".album-fetch-").suffix(".part");
        // Delivered files are ordinary files, not owner-only temporaries
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let partial = builder
            .tempfile_in(&dir)
            .map(|f| f.into_temp_path())
            .map_err(|e| PipelineError::io("failed to create partial output", e))?;

        let args = self.build_args(artifact.path(), cover, tags, &partial);
        tracing::info!(
            "Converting {} ({} bytes of {}) to {}",
            artifact.video,
            artifact.bytes,
            artifact.container,
            output.display()
        );

        let result = Command::new(&self.settings.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        // The scratch artifact is done with, whatever ffmpeg did
        drop(artifact);

        let run = result.map_err(|e| {
            PipelineError::TranscodeFailed(format!(
                "failed to run {}: {}",
                self.settings.ffmpeg_path, e
            ))
        })?;

        if !run.status.success() {
            let stderr = String::from_utf8_lossy(&run.stderr);
            return Err(PipelineError::TranscodeFailed(format!(
                "{} ({})",
                run.status,
                stderr_tail(&stderr)
            )));
        }

        partial.persist(output).map_err(|e| {
            PipelineError::io(format!("failed to move output to {}", output.display()), e.error)
        })?;

        tracing::info!("Converted audio to {}", output.display());

        Ok(TaggedAudioFile {
            path: output.to_path_buf(),
            tags: tags.clone(),
            has_cover: cover.is_some(),
        })
    }

    /// Get ffmpeg version line (for diagnostics)
    pub async fn version(&self) -> Option<String> {
        Command::new(&self.settings.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .lines()
                    .next()
                    .map(|l| l.trim().to_string())
            })
    }
}

/// Last few non-empty lines of ffmpeg's stderr
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(3);
    let tail = lines[start..].join(" | ");
    if tail.is_empty() {
        "no output".to_string()
    } else {
        tail
    }
}
