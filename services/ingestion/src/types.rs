//! Domain types for the video ingestion pipeline.
//!
//! Upload events arrive as S3 event notifications; everything downstream is
//! keyed by the video identity derived from the object key.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single upload-completion event: one object landed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    /// Bucket the object was uploaded to
    pub bucket: String,
    /// Full object key, including the staging prefix
    pub key: String,
}

impl UploadEvent {
    /// File name component of the key (everything after the last `/`).
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// Top-level key prefix, used to verify the object sits in the
    /// unprocessed staging area.
    pub fn top_level_prefix(&self) -> &str {
        self.key.split('/').next().unwrap_or("")
    }
}

/// S3 event notification envelope as delivered on the uploads topic.
#[derive(Debug, Deserialize)]
pub struct S3EventNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3BucketRef,
    pub object: S3ObjectRef,
}

#[derive(Debug, Deserialize)]
pub struct S3BucketRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3ObjectRef {
    pub key: String,
}

impl S3EventNotification {
    /// Flatten the notification into upload events, in record order.
    pub fn upload_events(self) -> Vec<UploadEvent> {
        self.records
            .into_iter()
            .map(|record| UploadEvent {
                bucket: record.s3.bucket.name,
                key: record.s3.object.key,
            })
            .collect()
    }
}

/// Correlation id for a video: the uploaded file name stripped of its
/// extension. Deterministic per object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn from_key(key: &str) -> Self {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let stem = file_name.split('.').next().unwrap_or(file_name);
        Self(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw metadata as read from the object store.
#[derive(Debug, Clone, Default)]
pub struct RawObjectMeta {
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
}

/// Validated object metadata driving the gate decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub id: VideoId,
    pub content_type: String,
    pub size_bytes: u64,
}

impl ObjectMeta {
    /// Shape the raw store response into pipeline metadata. Missing or
    /// nonsensical fields mean the upload is unusable.
    pub fn from_raw(id: VideoId, raw: RawObjectMeta) -> Result<Self> {
        let content_type = raw
            .content_type
            .ok_or_else(|| anyhow!("object has no content type"))?;
        let size_bytes = raw
            .size_bytes
            .ok_or_else(|| anyhow!("object has no content length"))?;
        let size_bytes = u64::try_from(size_bytes)
            .map_err(|_| anyhow!("object reports negative content length: {size_bytes}"))?;

        Ok(Self {
            id,
            content_type,
            size_bytes,
        })
    }
}

/// Recognized video content types and their canonical extensions. Anything
/// outside this set is rejected at the type gate.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "video/x-msvideo" => Some("avi"),
        "video/mp4" => Some("mp4"),
        "video/mpeg" => Some("mpeg"),
        "video/ogg" => Some("ogv"),
        "video/mp2t" => Some("ts"),
        "video/webm" => Some("webm"),
        "video/3gpp" => Some("3gp"),
        "video/3gpp2" => Some("3g2"),
        _ => None,
    }
}

pub fn is_video_type(content_type: &str) -> bool {
    extension_for_content_type(content_type).is_some()
}

/// Terminal processing state carried on status notifications. `Failed`
/// serializes as `DELETED`: the failure paths all end with the source
/// object removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "DELETED")]
    Failed,
}

/// Why an upload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Metadata unreadable, or probe/extract/upload/resize failed
    Corrupted,
    /// Size exceeds the configured maximum
    MaxFileSizeOverflow,
    /// Content type outside the recognized video set
    NotAVideoType,
    /// Presign or relocation trouble; worth retrying the upload
    InternalErrorPleaseTryAgainLater,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Corrupted => "CORRUPTED",
            FailureReason::MaxFileSizeOverflow => "MAX_FILE_SIZE_OVERFLOW",
            FailureReason::NotAVideoType => "NOT_A_VIDEO_TYPE",
            FailureReason::InternalErrorPleaseTryAgainLater => {
                "INTERNAL_ERROR_PLEASE_TRY_AGAIN_LATER"
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success note paired with `ProcessingState::Ready`.
pub const AWAIT_FOR_REGISTRATION: &str = "AWAIT_FOR_REGISTRATION";

/// Status notification payload published per terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub video_id: String,
    pub state: ProcessingState,
    pub note: String,
}

impl StatusUpdate {
    pub fn ready(video_id: &VideoId) -> Self {
        Self {
            video_id: video_id.to_string(),
            state: ProcessingState::Ready,
            note: AWAIT_FOR_REGISTRATION.to_string(),
        }
    }

    pub fn failed(video_id: &VideoId, reason: FailureReason) -> Self {
        Self {
            video_id: video_id.to_string(),
            state: ProcessingState::Failed,
            note: reason.as_str().to_string(),
        }
    }
}

/// Thumbnail object created on the success path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailArtifact {
    pub bucket: String,
    pub key: String,
    pub size_spec: (u32, u32),
}

/// Downstream-visible summary of a successfully ingested video. Computed
/// here, persisted by the registration store.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRecord {
    pub hash_id: String,
    pub video_type: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub thumbnail_url: String,
    pub upload_time: DateTime<Utc>,
    pub is_registered: bool,
    pub is_private: bool,
}

impl RegistrationRecord {
    pub fn new(meta: &ObjectMeta, duration_seconds: f64, thumbnail_url: String) -> Self {
        Self {
            hash_id: meta.id.to_string(),
            video_type: meta.content_type.clone(),
            size_bytes: meta.size_bytes,
            duration_seconds,
            thumbnail_url,
            upload_time: Utc::now(),
            is_registered: false,
            is_private: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_s3_event_notification() {
        let json = r#"{
            "Records": [{
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "up", "arn": "arn:aws:s3:::up" },
                    "object": { "key": "unprocessed/abc123.mp4", "size": 1000000 }
                }
            }]
        }"#;

        let notification: S3EventNotification = serde_json::from_str(json).unwrap();
        let events = notification.upload_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bucket, "up");
        assert_eq!(events[0].key, "unprocessed/abc123.mp4");
    }

    #[test]
    fn test_upload_event_key_components() {
        let event = UploadEvent {
            bucket: "up".to_string(),
            key: "unprocessed/abc123.mp4".to_string(),
        };
        assert_eq!(event.top_level_prefix(), "unprocessed");
        assert_eq!(event.file_name(), "abc123.mp4");
    }

    #[test]
    fn test_video_id_strips_prefix_and_extension() {
        assert_eq!(VideoId::from_key("unprocessed/abc123.mp4").as_str(), "abc123");
        assert_eq!(VideoId::from_key("abc123.mp4").as_str(), "abc123");
        // Identity cuts at the first dot, matching the thumbnail naming
        assert_eq!(VideoId::from_key("a/b/clip.tar.gz").as_str(), "clip");
    }

    #[test]
    fn test_recognized_video_types() {
        assert_eq!(extension_for_content_type("video/mp4"), Some("mp4"));
        assert_eq!(extension_for_content_type("video/x-msvideo"), Some("avi"));
        assert_eq!(extension_for_content_type("video/ogg"), Some("ogv"));
        assert_eq!(extension_for_content_type("video/mp2t"), Some("ts"));
        assert_eq!(extension_for_content_type("video/3gpp2"), Some("3g2"));
        assert!(!is_video_type("image/png"));
        assert!(!is_video_type("video/quicktime"));
    }

    #[test]
    fn test_object_meta_from_raw() {
        let raw = RawObjectMeta {
            content_type: Some("video/mp4".to_string()),
            size_bytes: Some(1_000_000),
        };
        let meta = ObjectMeta::from_raw(VideoId::from_key("unprocessed/v.mp4"), raw).unwrap();
        assert_eq!(meta.content_type, "video/mp4");
        assert_eq!(meta.size_bytes, 1_000_000);

        let missing_type = RawObjectMeta {
            content_type: None,
            size_bytes: Some(1),
        };
        assert!(ObjectMeta::from_raw(VideoId::from_key("v.mp4"), missing_type).is_err());

        let negative = RawObjectMeta {
            content_type: Some("video/mp4".to_string()),
            size_bytes: Some(-1),
        };
        assert!(ObjectMeta::from_raw(VideoId::from_key("v.mp4"), negative).is_err());
    }

    #[test]
    fn test_status_update_wire_format() {
        let ready = StatusUpdate::ready(&VideoId::from_key("unprocessed/abc123.mp4"));
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["video_id"], "abc123");
        assert_eq!(json["state"], "READY");
        assert_eq!(json["note"], "AWAIT_FOR_REGISTRATION");

        let failed = StatusUpdate::failed(
            &VideoId::from_key("unprocessed/abc123.mp4"),
            FailureReason::MaxFileSizeOverflow,
        );
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"], "DELETED");
        assert_eq!(json["note"], "MAX_FILE_SIZE_OVERFLOW");
    }

    #[test]
    fn test_failure_reason_codes() {
        assert_eq!(FailureReason::Corrupted.as_str(), "CORRUPTED");
        assert_eq!(
            FailureReason::InternalErrorPleaseTryAgainLater.as_str(),
            "INTERNAL_ERROR_PLEASE_TRY_AGAIN_LATER"
        );
        assert_eq!(FailureReason::NotAVideoType.as_str(), "NOT_A_VIDEO_TYPE");
    }
}
