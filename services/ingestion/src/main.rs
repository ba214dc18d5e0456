use anyhow::{Context, Result};
use ingestion_service::config::Config;
use ingestion_service::consumer::UploadEventConsumer;
use ingestion_service::media::FfmpegTool;
use ingestion_service::notify::KafkaStatusNotifier;
use ingestion_service::object_store::S3Gateway;
use ingestion_service::pipeline::IngestionPipeline;
use ingestion_service::resize::HttpResizeClient;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration; a missing required setting aborts startup here,
    // before any event is consumed
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        "Starting video ingestion service"
    );

    // Initialize metrics
    init_metrics(config.service.metrics_port)?;

    // Initialize collaborators once; the pipeline borrows them for its
    // whole lifetime
    let store = Arc::new(
        S3Gateway::new(&config.store)
            .await
            .context("Failed to initialize object store gateway")?,
    );

    let media = Arc::new(FfmpegTool::new(&config.processing));

    let resizer = Arc::new(
        HttpResizeClient::new(&config.resizer, config.processing.thumbnail_acl.clone())
            .context("Failed to initialize resize client")?,
    );

    let notifier = Arc::new(
        KafkaStatusNotifier::new(&config.kafka).context("Failed to initialize status notifier")?,
    );

    let pipeline = Arc::new(IngestionPipeline::new(
        store,
        media,
        resizer,
        notifier,
        config.processing.clone(),
    ));

    let consumer = UploadEventConsumer::new(&config.kafka, pipeline)
        .context("Failed to initialize upload event consumer")?;

    // Spawn consumer task
    let consumer_handle = tokio::spawn(async move {
        if let Err(e) = consumer.run().await {
            error!(error = %e, "Upload event consumer error");
        }
    });

    info!("Ingestion service started successfully");

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutting down ingestion service");

    consumer_handle.abort();

    info!("Ingestion service stopped");

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}

/// Initialize Prometheus metrics exporter
fn init_metrics(port: u16) -> Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();

    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus metrics exporter")?;

    info!(port = port, "Prometheus metrics exporter started");

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
