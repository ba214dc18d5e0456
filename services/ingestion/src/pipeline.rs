//! The ingestion pipeline: the per-upload state machine.
//!
//! One upload event drives one linear pass: prefix check, metadata fetch,
//! size and type gates, media processing (probe, frame, resize), relocation,
//! finalization. Gates run cheapest-first so an obviously bad upload never
//! reaches the external media tools. Every non-fatal failure path deletes
//! the source object before terminating, so a rejected upload never sits in
//! the unprocessed area waiting to be picked up again.

use crate::config::ProcessingConfig;
use crate::media::MediaTool;
use crate::notify::StatusNotifier;
use crate::object_store::ObjectStore;
use crate::resize::ThumbnailResizer;
use crate::thumbnail::ThumbnailExtractor;
use crate::types::{
    is_video_type, FailureReason, ObjectMeta, RegistrationRecord, StatusUpdate, ThumbnailArtifact,
    UploadEvent, VideoId,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Fixed thumbnail target size
pub const THUMBNAIL_SIZE: (u32, u32) = (360, 200);

/// Lifetime of the time-limited read handle handed to the media tools
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(600);

/// Infrastructure faults: cleanup and notification are attempted where
/// possible, then the fault propagates so the hosting layer can apply its
/// own retry or dead-lettering policy.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("object key {key:?} is outside the unprocessed prefix {expected:?}")]
    UnexpectedPrefix { key: String, expected: String },

    #[error("failed to read object metadata for {bucket}/{key}: {source:#}")]
    MetadataFetch {
        bucket: String,
        key: String,
        source: anyhow::Error,
    },

    #[error("failed to presign read for {bucket}/{key}: {source:#}")]
    Presign {
        bucket: String,
        key: String,
        source: anyhow::Error,
    },

    #[error("failed to relocate {key} to the unregistered prefix: {source:#}")]
    Relocation {
        key: String,
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn status_code(&self) -> u16 {
        500
    }
}

/// Terminal outcome of one pipeline invocation.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Video validated, thumbnailed, and relocated; awaiting registration.
    Completed { record: RegistrationRecord },
    /// Upload rejected and deleted; the reason was published.
    Rejected {
        video_id: VideoId,
        reason: FailureReason,
    },
}

impl PipelineOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineOutcome::Completed { .. } => 200,
            PipelineOutcome::Rejected { .. } => 400,
        }
    }
}

/// Orchestrates validation, media processing, relocation, and cleanup for
/// one upload event. Collaborators are injected once at startup.
pub struct IngestionPipeline {
    store: Arc<dyn ObjectStore>,
    media: Arc<dyn MediaTool>,
    thumbnails: ThumbnailExtractor,
    resizer: Arc<dyn ThumbnailResizer>,
    notifier: Arc<dyn StatusNotifier>,
    config: ProcessingConfig,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        media: Arc<dyn MediaTool>,
        resizer: Arc<dyn ThumbnailResizer>,
        notifier: Arc<dyn StatusNotifier>,
        config: ProcessingConfig,
    ) -> Self {
        let thumbnails =
            ThumbnailExtractor::new(media.clone(), store.clone(), config.thumbnail_acl.clone());

        Self {
            store,
            media,
            thumbnails,
            resizer,
            notifier,
            config,
        }
    }

    /// Run the full pipeline for one upload event.
    #[instrument(skip(self, event), fields(bucket = %event.bucket, key = %event.key))]
    pub async fn process(&self, event: &UploadEvent) -> Result<PipelineOutcome, PipelineError> {
        // An object outside the unprocessed prefix means the trigger wiring
        // is wrong. No identity can be derived yet, so there is nothing to
        // clean up or notify.
        if event.top_level_prefix() != self.config.unprocessed_prefix {
            return Err(PipelineError::UnexpectedPrefix {
                key: event.key.clone(),
                expected: self.config.unprocessed_prefix.clone(),
            });
        }

        let raw = self
            .store
            .head(&event.bucket, &event.key)
            .await
            .map_err(|source| PipelineError::MetadataFetch {
                bucket: event.bucket.clone(),
                key: event.key.clone(),
                source,
            })?;

        let video_id = VideoId::from_key(&event.key);

        let meta = match ObjectMeta::from_raw(video_id.clone(), raw) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(video_id = %video_id, error = %err, "Object metadata unusable");
                return Ok(self.reject(event, video_id, FailureReason::Corrupted).await);
            }
        };

        info!(
            video_id = %video_id,
            content_type = %meta.content_type,
            size_bytes = meta.size_bytes,
            "Upload metadata fetched"
        );

        if meta.size_bytes > self.config.max_video_size_bytes {
            warn!(
                video_id = %video_id,
                size_bytes = meta.size_bytes,
                max_bytes = self.config.max_video_size_bytes,
                "Upload exceeds size limit"
            );
            return Ok(self
                .reject(event, video_id, FailureReason::MaxFileSizeOverflow)
                .await);
        }

        if !is_video_type(&meta.content_type) {
            warn!(
                video_id = %video_id,
                content_type = %meta.content_type,
                "Upload is not a recognized video type"
            );
            return Ok(self
                .reject(event, video_id, FailureReason::NotAVideoType)
                .await);
        }

        let source_url = match self
            .store
            .presign_get(&event.bucket, &event.key, SIGNED_URL_TTL)
            .await
        {
            Ok(url) => url,
            Err(source) => {
                self.store.delete(&event.bucket, &event.key).await;
                self.emit(StatusUpdate::failed(
                    &video_id,
                    FailureReason::InternalErrorPleaseTryAgainLater,
                ))
                .await;
                return Err(PipelineError::Presign {
                    bucket: event.bucket.clone(),
                    key: event.key.clone(),
                    source,
                });
            }
        };

        let (duration_secs, thumbnail) = match self.media_phase(event, &video_id, &source_url).await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(video_id = %video_id, error = %err, "Media processing failed");
                return Ok(self.reject(event, video_id, FailureReason::Corrupted).await);
            }
        };

        let destination_key = format!("{}/{}", self.config.unregistered_prefix, event.file_name());
        if let Err(source) = self.relocate(event, &destination_key).await {
            // The copy may already have landed; this drops the unprocessed
            // copy regardless, leaving the destination (if any) in place.
            self.store.delete(&event.bucket, &event.key).await;
            self.emit(StatusUpdate::failed(
                &video_id,
                FailureReason::InternalErrorPleaseTryAgainLater,
            ))
            .await;
            return Err(PipelineError::Relocation {
                key: event.key.clone(),
                source,
            });
        }

        let thumbnail_url = format!(
            "https://{}.s3.amazonaws.com/{}",
            thumbnail.bucket, thumbnail.key
        );
        let record = RegistrationRecord::new(&meta, duration_secs, thumbnail_url);

        info!(
            video_id = %video_id,
            duration_seconds = duration_secs,
            destination = %destination_key,
            "Video ready for registration"
        );

        self.emit(StatusUpdate::ready(&video_id)).await;

        Ok(PipelineOutcome::Completed { record })
    }

    /// Probe duration, capture the thumbnail frame, resize it. Strictly
    /// sequential: each step feeds the next.
    async fn media_phase(
        &self,
        event: &UploadEvent,
        video_id: &VideoId,
        source_url: &str,
    ) -> Result<(f64, ThumbnailArtifact)> {
        let duration_secs = self.media.probe_duration_secs(source_url).await?;

        let thumbnail = ThumbnailArtifact {
            bucket: event.bucket.clone(),
            key: format!("{}/{}.png", self.config.thumbnails_prefix, video_id),
            size_spec: THUMBNAIL_SIZE,
        };

        self.thumbnails
            .capture(source_url, duration_secs, &thumbnail)
            .await?;

        self.resizer
            .resize(&thumbnail.bucket, &thumbnail.key, thumbnail.size_spec)
            .await?;

        Ok((duration_secs, thumbnail))
    }

    /// Copy to the unregistered prefix, then drop the original.
    async fn relocate(&self, event: &UploadEvent, destination_key: &str) -> Result<()> {
        self.store
            .copy(&event.bucket, &event.key, &event.bucket, destination_key)
            .await?;
        self.store.delete(&event.bucket, &event.key).await;
        Ok(())
    }

    /// Delete the source and publish the failure. The notification carries
    /// the primary reason; neither deletion nor publishing can override it.
    async fn reject(
        &self,
        event: &UploadEvent,
        video_id: VideoId,
        reason: FailureReason,
    ) -> PipelineOutcome {
        self.store.delete(&event.bucket, &event.key).await;
        self.emit(StatusUpdate::failed(&video_id, reason)).await;
        PipelineOutcome::Rejected { video_id, reason }
    }

    async fn emit(&self, update: StatusUpdate) {
        if let Err(err) = self.notifier.notify(&update).await {
            warn!(
                video_id = %update.video_id,
                error = %err,
                "Failed to publish status update"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaToolError, MockMediaTool};
    use crate::notify::{MockStatusNotifier, NotifyError};
    use crate::object_store::MockObjectStore;
    use crate::resize::MockThumbnailResizer;
    use crate::types::{ProcessingState, RawObjectMeta, AWAIT_FOR_REGISTRATION};
    use mockall::predicate::eq;

    const SOURCE_URL: &str = "https://signed.example/unprocessed/abc123.mp4";

    fn event() -> UploadEvent {
        UploadEvent {
            bucket: "up".to_string(),
            key: "unprocessed/abc123.mp4".to_string(),
        }
    }

    fn processing_config() -> ProcessingConfig {
        ProcessingConfig {
            unprocessed_prefix: "unprocessed".to_string(),
            unregistered_prefix: "unregistered".to_string(),
            thumbnails_prefix: "thumbnails".to_string(),
            thumbnail_acl: "public-read".to_string(),
            max_video_size_bytes: 5_000_000,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            media_timeout_secs: 60,
        }
    }

    fn video_meta(content_type: &str, size_bytes: i64) -> RawObjectMeta {
        RawObjectMeta {
            content_type: Some(content_type.to_string()),
            size_bytes: Some(size_bytes),
        }
    }

    fn build(
        store: MockObjectStore,
        media: MockMediaTool,
        resizer: MockThumbnailResizer,
        notifier: MockStatusNotifier,
    ) -> IngestionPipeline {
        IngestionPipeline::new(
            Arc::new(store),
            Arc::new(media),
            Arc::new(resizer),
            Arc::new(notifier),
            processing_config(),
        )
    }

    fn expect_source_delete(store: &mut MockObjectStore) {
        store
            .expect_delete()
            .with(eq("up"), eq("unprocessed/abc123.mp4"))
            .times(1)
            .returning(|_, _| ());
    }

    fn expect_failure_notification(notifier: &mut MockStatusNotifier, note: &'static str) {
        notifier
            .expect_notify()
            .withf(move |update| {
                update.video_id == "abc123"
                    && update.state == ProcessingState::Failed
                    && update.note == note
            })
            .times(1)
            .returning(|_| Ok(()));
    }

    #[tokio::test]
    async fn test_prefix_mismatch_is_fatal_and_touches_nothing() {
        let mut store = MockObjectStore::new();
        store.expect_head().never();
        store.expect_delete().never();
        let mut notifier = MockStatusNotifier::new();
        notifier.expect_notify().never();

        let pipeline = build(store, MockMediaTool::new(), MockThumbnailResizer::new(), notifier);

        let misrouted = UploadEvent {
            bucket: "up".to_string(),
            key: "incoming/abc123.mp4".to_string(),
        };

        let err = pipeline.process(&misrouted).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnexpectedPrefix { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_metadata_fetch_failure_propagates_without_cleanup() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));
        store.expect_delete().never();
        let mut notifier = MockStatusNotifier::new();
        notifier.expect_notify().never();

        let pipeline = build(store, MockMediaTool::new(), MockThumbnailResizer::new(), notifier);

        let err = pipeline.process(&event()).await.unwrap_err();
        assert!(matches!(err, PipelineError::MetadataFetch { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_unreadable_metadata_rejects_as_corrupted() {
        let mut store = MockObjectStore::new();
        store.expect_head().times(1).returning(|_, _| {
            Ok(RawObjectMeta {
                content_type: None,
                size_bytes: Some(1_000),
            })
        });
        expect_source_delete(&mut store);
        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "CORRUPTED");

        let pipeline = build(store, MockMediaTool::new(), MockThumbnailResizer::new(), notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::Rejected {
                reason: FailureReason::Corrupted,
                ..
            }
        ));
        assert_eq!(outcome.status_code(), 400);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_before_media_processing() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 10_000_000)));
        expect_source_delete(&mut store);
        store.expect_presign_get().never();
        store.expect_put().never();

        let mut media = MockMediaTool::new();
        media.expect_probe_duration_secs().never();

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "MAX_FILE_SIZE_OVERFLOW");

        let pipeline = build(store, media, MockThumbnailResizer::new(), notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::Rejected {
                reason: FailureReason::MaxFileSizeOverflow,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_non_video_upload_is_rejected_without_media_processing() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("image/png", 1_000_000)));
        expect_source_delete(&mut store);
        store.expect_presign_get().never();
        store.expect_copy().never();

        let mut media = MockMediaTool::new();
        media.expect_probe_duration_secs().never();
        media.expect_extract_frame().never();

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "NOT_A_VIDEO_TYPE");

        let pipeline = build(store, media, MockThumbnailResizer::new(), notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::Rejected {
                reason: FailureReason::NotAVideoType,
                ..
            }
        ));
        assert_eq!(outcome.status_code(), 400);
    }

    #[tokio::test]
    async fn test_presign_failure_cleans_up_and_propagates() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("signing key unavailable")));
        expect_source_delete(&mut store);

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "INTERNAL_ERROR_PLEASE_TRY_AGAIN_LATER");

        let pipeline = build(store, MockMediaTool::new(), MockThumbnailResizer::new(), notifier);

        let err = pipeline.process(&event()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Presign { .. }));
    }

    #[tokio::test]
    async fn test_probe_failure_rejects_as_corrupted() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .times(1)
            .returning(|_, _, _| Ok(SOURCE_URL.to_string()));
        expect_source_delete(&mut store);
        store.expect_put().never();
        store.expect_copy().never();

        let mut media = MockMediaTool::new();
        media
            .expect_probe_duration_secs()
            .with(eq(SOURCE_URL))
            .times(1)
            .returning(|_| {
                Err(MediaToolError::UnparseableDuration {
                    raw: "N/A".to_string(),
                })
            });
        media.expect_extract_frame().never();

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "CORRUPTED");

        let pipeline = build(store, media, MockThumbnailResizer::new(), notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::Rejected {
                reason: FailureReason::Corrupted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resize_failure_rejects_as_corrupted() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .times(1)
            .returning(|_, _, _| Ok(SOURCE_URL.to_string()));
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        expect_source_delete(&mut store);
        store.expect_copy().never();

        let mut media = MockMediaTool::new();
        media
            .expect_probe_duration_secs()
            .times(1)
            .returning(|_| Ok(40.0));
        media.expect_extract_frame().times(1).returning(|_, _, path| {
            std::fs::write(path, b"frame").unwrap();
            Ok(())
        });

        let mut resizer = MockThumbnailResizer::new();
        resizer
            .expect_resize()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("transform service unavailable")));

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "CORRUPTED");

        let pipeline = build(store, media, resizer, notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::Rejected {
                reason: FailureReason::Corrupted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_relocation_failure_deletes_source_and_propagates() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .times(1)
            .returning(|_, _, _| Ok(SOURCE_URL.to_string()));
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        store
            .expect_copy()
            .times(1)
            .returning(|_, _, _, _| Err(anyhow::anyhow!("copy interrupted")));
        expect_source_delete(&mut store);

        let mut media = MockMediaTool::new();
        media
            .expect_probe_duration_secs()
            .times(1)
            .returning(|_| Ok(40.0));
        media.expect_extract_frame().times(1).returning(|_, _, path| {
            std::fs::write(path, b"frame").unwrap();
            Ok(())
        });

        let mut resizer = MockThumbnailResizer::new();
        resizer.expect_resize().times(1).returning(|_, _, _| Ok(()));

        let mut notifier = MockStatusNotifier::new();
        expect_failure_notification(&mut notifier, "INTERNAL_ERROR_PLEASE_TRY_AGAIN_LATER");

        let pipeline = build(store, media, resizer, notifier);

        let err = pipeline.process(&event()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Relocation { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_valid_video_flows_end_to_end() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .with(eq("up"), eq("unprocessed/abc123.mp4"))
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .withf(|_, _, ttl| *ttl == Duration::from_secs(600))
            .times(1)
            .returning(|_, _, _| Ok(SOURCE_URL.to_string()));
        store
            .expect_put()
            .with(
                eq("up"),
                eq("thumbnails/abc123.png"),
                eq(b"frame".to_vec()),
                eq("image/png"),
                eq("public-read"),
            )
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        store
            .expect_copy()
            .with(
                eq("up"),
                eq("unprocessed/abc123.mp4"),
                eq("up"),
                eq("unregistered/abc123.mp4"),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        // The original is dropped exactly once, after the copy lands
        expect_source_delete(&mut store);

        let mut media = MockMediaTool::new();
        media
            .expect_probe_duration_secs()
            .with(eq(SOURCE_URL))
            .times(1)
            .returning(|_| Ok(40.0));
        media
            .expect_extract_frame()
            .withf(|url, at_secs, _path| url == SOURCE_URL && (*at_secs - 10.0).abs() < f64::EPSILON)
            .times(1)
            .returning(|_, _, path| {
                std::fs::write(path, b"frame").unwrap();
                Ok(())
            });

        let mut resizer = MockThumbnailResizer::new();
        resizer
            .expect_resize()
            .with(eq("up"), eq("thumbnails/abc123.png"), eq((360u32, 200u32)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut notifier = MockStatusNotifier::new();
        notifier
            .expect_notify()
            .withf(|update| {
                update.video_id == "abc123"
                    && update.state == ProcessingState::Ready
                    && update.note == AWAIT_FOR_REGISTRATION
            })
            .times(1)
            .returning(|_| Ok(()));

        let pipeline = build(store, media, resizer, notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert_eq!(outcome.status_code(), 200);

        match outcome {
            PipelineOutcome::Completed { record } => {
                assert_eq!(record.hash_id, "abc123");
                assert_eq!(record.video_type, "video/mp4");
                assert_eq!(record.size_bytes, 1_000_000);
                assert_eq!(record.duration_seconds, 40.0);
                assert_eq!(
                    record.thumbnail_url,
                    "https://up.s3.amazonaws.com/thumbnails/abc123.png"
                );
                assert!(!record.is_registered);
                assert!(record.is_private);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_change_outcome() {
        let mut store = MockObjectStore::new();
        store
            .expect_head()
            .times(1)
            .returning(|_, _| Ok(video_meta("video/mp4", 1_000_000)));
        store
            .expect_presign_get()
            .times(1)
            .returning(|_, _, _| Ok(SOURCE_URL.to_string()));
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        store.expect_copy().times(1).returning(|_, _, _, _| Ok(()));
        expect_source_delete(&mut store);

        let mut media = MockMediaTool::new();
        media
            .expect_probe_duration_secs()
            .times(1)
            .returning(|_| Ok(40.0));
        media.expect_extract_frame().times(1).returning(|_, _, path| {
            std::fs::write(path, b"frame").unwrap();
            Ok(())
        });

        let mut resizer = MockThumbnailResizer::new();
        resizer.expect_resize().times(1).returning(|_, _, _| Ok(()));

        let mut notifier = MockStatusNotifier::new();
        notifier.expect_notify().times(1).returning(|_| {
            Err(NotifyError::Publish {
                topic: "videos.status".to_string(),
                message: "broker down".to_string(),
            })
        });

        let pipeline = build(store, media, resizer, notifier);

        let outcome = pipeline.process(&event()).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::Completed { .. }));
    }
}
