use crate::media::MediaTool;
use crate::object_store::ObjectStore;
use crate::types::ThumbnailArtifact;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Derives a representative frame from a video stream and uploads it as the
/// video's thumbnail.
pub struct ThumbnailExtractor {
    media: Arc<dyn MediaTool>,
    store: Arc<dyn ObjectStore>,
    acl: String,
}

impl ThumbnailExtractor {
    pub fn new(media: Arc<dyn MediaTool>, store: Arc<dyn ObjectStore>, acl: String) -> Self {
        Self { media, store, acl }
    }

    /// Extract a frame at one quarter of the stream duration and upload it
    /// under the artifact's key. The frame lands in a per-call temp
    /// directory that is removed when this returns, on every path.
    #[instrument(skip(self, source_url, artifact), fields(key = %artifact.key))]
    pub async fn capture(
        &self,
        source_url: &str,
        duration_secs: f64,
        artifact: &ThumbnailArtifact,
    ) -> Result<()> {
        let anchor_secs = duration_secs / 4.0;

        let scratch = tempfile::TempDir::new().context("Failed to create frame scratch dir")?;
        let frame_path = scratch.path().join("frame.png");

        self.media
            .extract_frame(source_url, anchor_secs, &frame_path)
            .await
            .context("Failed to extract frame")?;

        let frame = tokio::fs::read(&frame_path)
            .await
            .context("Failed to read extracted frame")?;

        debug!(
            anchor_secs,
            size_bytes = frame.len(),
            "Uploading thumbnail frame"
        );

        self.store
            .put(&artifact.bucket, &artifact.key, frame, "image/png", &self.acl)
            .await
            .context("Failed to upload thumbnail")?;

        Ok(())
    }
}
