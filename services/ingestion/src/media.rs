//! External media tooling: duration probing and frame extraction.
//!
//! Both operations shell out to the ffmpeg suite against a readable URL, so
//! the source object never has to be downloaded. Failures carry the tool's
//! stderr; the pipeline decides what a failure means.

use crate::config::ProcessingConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Errors from media tool invocations
#[derive(Error, Debug)]
pub enum MediaToolError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {code:?}: {stderr}")]
    CommandFailed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout:?}")]
    Timeout {
        tool: &'static str,
        timeout: Duration,
    },

    #[error("unparseable duration in probe output: {raw:?}")]
    UnparseableDuration { raw: String },

    #[error("no frame written to {path}")]
    MissingFrame { path: PathBuf },
}

/// Abstract media capability: probe a stream's duration, pull one frame.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Total duration of the source stream in seconds.
    async fn probe_duration_secs(&self, source_url: &str) -> Result<f64, MediaToolError>;

    /// Extract a single frame at the given offset into `out_path`.
    async fn extract_frame(
        &self,
        source_url: &str,
        at_secs: f64,
        out_path: &Path,
    ) -> Result<(), MediaToolError>;
}

/// ffmpeg/ffprobe subprocess implementation
pub struct FfmpegTool {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: Duration::from_secs(config.media_timeout_secs),
        }
    }

    async fn run(
        &self,
        tool: &'static str,
        command: &mut Command,
    ) -> Result<std::process::Output, MediaToolError> {
        let output = tokio::time::timeout(
            self.timeout,
            command.stdout(Stdio::piped()).stderr(Stdio::piped()).output(),
        )
        .await
        .map_err(|_| MediaToolError::Timeout {
            tool,
            timeout: self.timeout,
        })?
        .map_err(|source| MediaToolError::Spawn { tool, source })?;

        if !output.status.success() {
            return Err(MediaToolError::CommandFailed {
                tool,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[instrument(skip(self, source_url))]
    async fn probe_duration_secs(&self, source_url: &str) -> Result<f64, MediaToolError> {
        let mut command = Command::new(&self.ffprobe_path);
        command
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(source_url);

        let output = self.run("ffprobe", &mut command).await?;
        let duration = parse_duration(&String::from_utf8_lossy(&output.stdout))?;

        debug!(duration_seconds = duration, "Probed stream duration");
        Ok(duration)
    }

    #[instrument(skip(self, source_url, out_path))]
    async fn extract_frame(
        &self,
        source_url: &str,
        at_secs: f64,
        out_path: &Path,
    ) -> Result<(), MediaToolError> {
        let seek = format_seek_timestamp(at_secs);

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-y")
            .arg("-ss")
            .arg(&seek)
            .arg("-i")
            .arg(source_url)
            .arg("-frames:v")
            .arg("1")
            .arg(out_path);

        self.run("ffmpeg", &mut command).await?;

        // ffmpeg can exit zero without producing output (e.g. seek past EOF)
        if tokio::fs::metadata(out_path).await.is_err() {
            return Err(MediaToolError::MissingFrame {
                path: out_path.to_path_buf(),
            });
        }

        debug!(seek = %seek, "Frame extracted");
        Ok(())
    }
}

/// Parse ffprobe's single-value duration output.
fn parse_duration(raw: &str) -> Result<f64, MediaToolError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| MediaToolError::UnparseableDuration {
            raw: raw.trim().to_string(),
        })
}

/// Format a seek offset as `hh:mm:ss`, truncating sub-second precision.
fn format_seek_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("40.000000\n").unwrap(), 40.0);
        assert_eq!(parse_duration("12.5").unwrap(), 12.5);
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_format_seek_timestamp_truncates_subseconds() {
        assert_eq!(format_seek_timestamp(10.0), "00:00:10");
        assert_eq!(format_seek_timestamp(10.9), "00:00:10");
        assert_eq!(format_seek_timestamp(0.0), "00:00:00");
        assert_eq!(format_seek_timestamp(3725.4), "01:02:05");
    }

    #[test]
    fn test_format_seek_timestamp_clamps_negative() {
        assert_eq!(format_seek_timestamp(-3.0), "00:00:00");
    }
}
