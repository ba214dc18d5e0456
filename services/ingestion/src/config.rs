use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by startup configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Main configuration for the ingestion service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Kafka configuration
    pub kafka: KafkaConfig,
    /// Object store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Pipeline processing configuration
    pub processing: ProcessingConfig,
    /// Thumbnail transform service configuration
    pub resizer: ResizerConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging/metrics
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Metrics port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// Kafka configuration for the uploads consumer and status producer
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    /// Kafka bootstrap servers
    pub bootstrap_servers: String,
    /// Consumer group ID
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
    /// Topic carrying S3 upload-completion notifications
    #[serde(default = "default_uploads_topic")]
    pub uploads_topic: String,
    /// Topic for processing status updates
    #[serde(default = "default_status_topic")]
    pub status_topic: String,
    /// Enable SSL
    #[serde(default)]
    pub ssl_enabled: bool,
    /// SSL CA certificate path
    pub ssl_ca_location: Option<String>,
    /// SASL username
    pub sasl_username: Option<String>,
    /// SASL password
    pub sasl_password: Option<String>,
    /// Auto offset reset policy
    #[serde(default = "default_auto_offset_reset")]
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u32,
    /// Max poll interval in milliseconds
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u32,
    /// Producer delivery timeout in milliseconds
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
}

/// Object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// Pipeline processing configuration. The prefixes and limits here are
/// required; the service refuses to start without them.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Top-level key prefix where fresh uploads land
    pub unprocessed_prefix: String,
    /// Top-level key prefix for validated, not-yet-registered videos
    pub unregistered_prefix: String,
    /// Key prefix for derived thumbnails
    pub thumbnails_prefix: String,
    /// Canned ACL applied to uploaded thumbnails
    pub thumbnail_acl: String,
    /// Maximum accepted video size in bytes
    pub max_video_size_bytes: u64,
    /// ffmpeg executable path
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// ffprobe executable path
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    /// Timeout for a single media tool invocation, in seconds
    #[serde(default = "default_media_timeout_secs")]
    pub media_timeout_secs: u64,
}

/// Thumbnail transform service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResizerConfig {
    /// Transform service address
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_resizer_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Default value functions
fn default_service_name() -> String {
    "ingestion-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_consumer_group() -> String {
    "ingestion-service".to_string()
}

fn default_uploads_topic() -> String {
    "videos.uploads".to_string()
}

fn default_status_topic() -> String {
    "videos.status".to_string()
}

fn default_auto_offset_reset() -> String {
    "earliest".to_string()
}

fn default_session_timeout_ms() -> u32 {
    30000
}

fn default_max_poll_interval_ms() -> u32 {
    300000
}

fn default_delivery_timeout_ms() -> u64 {
    30000
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_media_timeout_secs() -> u64 {
    60
}

fn default_resizer_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Add config file if present
            .add_source(config::File::with_name("config/ingestion").required(false))
            .add_source(config::File::with_name("/etc/videos/ingestion").required(false))
            // Override with environment variables
            // INGESTION__PROCESSING__UNPROCESSED_PREFIX -> processing.unprocessed_prefix
            .add_source(
                config::Environment::with_prefix("INGESTION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that deserialize but cannot run. Called once
    /// at startup, before any event is consumed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kafka.bootstrap_servers.is_empty() {
            return Err(ConfigError::MissingRequired(
                "kafka.bootstrap_servers".to_string(),
            ));
        }

        for (key, value) in [
            (
                "processing.unprocessed_prefix",
                &self.processing.unprocessed_prefix,
            ),
            (
                "processing.unregistered_prefix",
                &self.processing.unregistered_prefix,
            ),
            (
                "processing.thumbnails_prefix",
                &self.processing.thumbnails_prefix,
            ),
            ("processing.thumbnail_acl", &self.processing.thumbnail_acl),
            ("resizer.endpoint", &self.resizer.endpoint),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingRequired(key.to_string()));
            }
        }

        if self.processing.max_video_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "processing.max_video_size_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for (key, prefix) in [
            (
                "processing.unprocessed_prefix",
                &self.processing.unprocessed_prefix,
            ),
            (
                "processing.unregistered_prefix",
                &self.processing.unregistered_prefix,
            ),
            (
                "processing.thumbnails_prefix",
                &self.processing.thumbnails_prefix,
            ),
        ] {
            if prefix.contains('/') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be a bare top-level prefix without '/'".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get media tool timeout as Duration
    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.processing.media_timeout_secs)
    }

    /// Get resize request timeout as Duration
    pub fn resizer_timeout(&self) -> Duration {
        Duration::from_secs(self.resizer.request_timeout_secs)
    }

    /// Get producer delivery timeout as Duration
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.kafka.delivery_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}
