use crate::config::KafkaConfig;
use crate::pipeline::{IngestionPipeline, PipelineOutcome};
use crate::types::S3EventNotification;
use anyhow::{Context, Result};
use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Kafka consumer driving the ingestion pipeline from upload notifications
pub struct UploadEventConsumer {
    consumer: StreamConsumer,
    pipeline: Arc<IngestionPipeline>,
}

impl UploadEventConsumer {
    /// Create a consumer subscribed to the uploads topic
    pub fn new(config: &KafkaConfig, pipeline: Arc<IngestionPipeline>) -> Result<Self> {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("group.id", &config.consumer_group)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.auto.commit", "false")
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .set(
                "max.poll.interval.ms",
                config.max_poll_interval_ms.to_string(),
            );

        // Configure SSL if enabled
        if config.ssl_enabled {
            client_config.set("security.protocol", "SASL_SSL");
            if let Some(ref ca_location) = config.ssl_ca_location {
                client_config.set("ssl.ca.location", ca_location);
            }
        }

        // Configure SASL if credentials provided
        if let (Some(ref username), Some(ref password)) =
            (&config.sasl_username, &config.sasl_password)
        {
            client_config
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        let consumer: StreamConsumer = client_config
            .create()
            .context("Failed to create Kafka consumer")?;

        consumer
            .subscribe(&[&config.uploads_topic])
            .context("Failed to subscribe to uploads topic")?;

        info!(
            topic = %config.uploads_topic,
            group = %config.consumer_group,
            "Subscribed to uploads topic"
        );

        Ok(Self { consumer, pipeline })
    }

    /// Consume upload notifications until the stream ends.
    ///
    /// Terminal pipeline outcomes commit the offset. Infrastructure faults
    /// leave it uncommitted so the hosting layer's redelivery applies.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<()> {
        info!("Starting upload event consumer");

        let mut message_stream = self.consumer.stream();

        while let Some(message_result) = message_stream.next().await {
            match message_result {
                Ok(message) => {
                    if let Err(e) = self.process_message(&message).await {
                        error!(
                            error = ?e,
                            partition = message.partition(),
                            offset = message.offset(),
                            "Upload processing faulted; leaving offset uncommitted"
                        );
                        metrics::counter!("ingestion.videos.faulted").increment(1);
                    } else if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async)
                    {
                        warn!(error = %e, "Failed to commit offset");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Kafka consumer error");
                    metrics::counter!("ingestion.kafka.errors").increment(1);
                }
            }
        }

        Ok(())
    }

    /// Process a single Kafka message
    #[instrument(skip(self, message), fields(partition = message.partition(), offset = message.offset()))]
    async fn process_message(&self, message: &BorrowedMessage<'_>) -> Result<()> {
        let payload = message.payload().context("Message has no payload")?;

        let notification: S3EventNotification = match serde_json::from_slice(payload) {
            Ok(notification) => notification,
            Err(err) => {
                // A payload that will never decode must not wedge the
                // partition: count it and move on.
                warn!(error = %err, "Undecodable upload notification; skipping");
                metrics::counter!("ingestion.messages.undecodable").increment(1);
                return Ok(());
            }
        };

        for event in notification.upload_events() {
            debug!(bucket = %event.bucket, key = %event.key, "Received upload event");

            let started = std::time::Instant::now();
            let result = self.pipeline.process(&event).await;
            metrics::histogram!("ingestion.pipeline.duration_seconds")
                .record(started.elapsed().as_secs_f64());

            match result {
                Ok(PipelineOutcome::Completed { ref record }) => {
                    info!(
                        video_id = %record.hash_id,
                        status = 200,
                        "Upload ingested"
                    );
                    metrics::counter!("ingestion.videos.completed").increment(1);
                }
                Ok(PipelineOutcome::Rejected { video_id, reason }) => {
                    warn!(
                        video_id = %video_id,
                        reason = %reason,
                        status = 400,
                        "Upload rejected"
                    );
                    metrics::counter!("ingestion.videos.rejected").increment(1);
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("Pipeline faulted for {}/{}", event.bucket, event.key)
                    });
                }
            }
        }

        Ok(())
    }
}
