//! Video upload ingestion service.
//!
//! Watches an uploads topic for S3 upload-completion notifications and runs
//! each object through the ingestion pipeline:
//!
//! - validate size and content type against configured limits
//! - probe the stream's duration and capture a thumbnail frame
//! - resize the thumbnail through the external transform service
//! - relocate the source into the unregistered prefix
//! - publish one status notification per terminal outcome
//!
//! Rejected uploads are deleted from the staging area so they are never
//! reprocessed.

pub mod config;
pub mod consumer;
pub mod media;
pub mod notify;
pub mod object_store;
pub mod pipeline;
pub mod resize;
pub mod thumbnail;
pub mod types;

// Re-export main types
pub use config::{Config, ConfigError, KafkaConfig, ProcessingConfig, ResizerConfig, StoreConfig};
pub use consumer::UploadEventConsumer;
pub use media::{FfmpegTool, MediaTool, MediaToolError};
pub use notify::{KafkaStatusNotifier, NotifyError, StatusNotifier};
pub use object_store::{ObjectStore, S3Gateway};
pub use pipeline::{
    IngestionPipeline, PipelineError, PipelineOutcome, SIGNED_URL_TTL, THUMBNAIL_SIZE,
};
pub use resize::{HttpResizeClient, ThumbnailResizer};
pub use thumbnail::ThumbnailExtractor;
pub use types::{
    FailureReason, ObjectMeta, ProcessingState, RegistrationRecord, StatusUpdate, UploadEvent,
    VideoId,
};
