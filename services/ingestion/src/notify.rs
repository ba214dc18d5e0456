//! Status notification publishing.
//!
//! The pipeline treats notification delivery as fire-and-forget: a publish
//! failure is logged by the caller, never escalated, so it cannot mask the
//! outcome it reports.

use crate::config::KafkaConfig;
use crate::types::StatusUpdate;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while publishing a status update
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to create producer: {0}")]
    Creation(String),

    #[error("Failed to serialize status update: {0}")]
    Serialization(String),

    #[error("Failed to publish to topic {topic}: {message}")]
    Publish { topic: String, message: String },
}

/// Emits one notification per terminal pipeline outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn notify(&self, update: &StatusUpdate) -> Result<(), NotifyError>;
}

/// Kafka-backed notifier publishing JSON status updates keyed by video id
pub struct KafkaStatusNotifier {
    producer: FutureProducer,
    topic: String,
    delivery_timeout: Duration,
}

impl KafkaStatusNotifier {
    pub fn new(config: &KafkaConfig) -> Result<Self, NotifyError> {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("acks", "all");

        if config.ssl_enabled {
            client_config.set("security.protocol", "SASL_SSL");
            if let Some(ref ca_location) = config.ssl_ca_location {
                client_config.set("ssl.ca.location", ca_location);
            }
        }

        if let (Some(ref username), Some(ref password)) =
            (&config.sasl_username, &config.sasl_password)
        {
            client_config
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        let producer: FutureProducer = client_config
            .create()
            .map_err(|e| NotifyError::Creation(e.to_string()))?;

        info!(topic = %config.status_topic, "Status notifier initialized");

        Ok(Self {
            producer,
            topic: config.status_topic.clone(),
            delivery_timeout: Duration::from_millis(config.delivery_timeout_ms),
        })
    }
}

#[async_trait]
impl StatusNotifier for KafkaStatusNotifier {
    async fn notify(&self, update: &StatusUpdate) -> Result<(), NotifyError> {
        let payload =
            serde_json::to_vec(update).map_err(|e| NotifyError::Serialization(e.to_string()))?;

        let record = FutureRecord::to(&self.topic)
            .payload(&payload)
            .key(update.video_id.as_str());

        self.producer
            .send(record, Timeout::After(self.delivery_timeout))
            .await
            .map_err(|(e, _)| NotifyError::Publish {
                topic: self.topic.clone(),
                message: e.to_string(),
            })?;

        debug!(
            video_id = %update.video_id,
            state = ?update.state,
            note = %update.note,
            "Status update published"
        );

        Ok(())
    }
}
