use crate::config::ResizerConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

/// Synchronous thumbnail resize capability backed by an external transform
/// service. The call blocks until the service answers; errors surface to
/// the caller unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThumbnailResizer: Send + Sync {
    async fn resize(&self, bucket: &str, key: &str, target: (u32, u32)) -> Result<()>;
}

/// Request body the transform service accepts. Resizing happens in place:
/// source and destination name the same object.
#[derive(Debug, Serialize)]
struct ResizeRequest<'a> {
    source_bucket: &'a str,
    source_key: &'a str,
    dest_bucket: &'a str,
    dest_key: &'a str,
    new_size: [u32; 2],
    acl: &'a str,
}

/// HTTP client for the transform service
pub struct HttpResizeClient {
    http: reqwest::Client,
    endpoint: String,
    acl: String,
}

impl HttpResizeClient {
    pub fn new(config: &ResizerConfig, acl: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build resize HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            acl,
        })
    }
}

#[async_trait]
impl ThumbnailResizer for HttpResizeClient {
    #[instrument(skip(self), fields(key = %key))]
    async fn resize(&self, bucket: &str, key: &str, target: (u32, u32)) -> Result<()> {
        let request = ResizeRequest {
            source_bucket: bucket,
            source_key: key,
            dest_bucket: bucket,
            dest_key: key,
            new_size: [target.0, target.1],
            acl: &self.acl,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Resize request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Resize service returned {status}: {body}"));
        }

        debug!(width = target.0, height = target.1, "Thumbnail resized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_request_wire_format() {
        let request = ResizeRequest {
            source_bucket: "up",
            source_key: "thumbnails/abc123.png",
            dest_bucket: "up",
            dest_key: "thumbnails/abc123.png",
            new_size: [360, 200],
            acl: "public-read",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["source_bucket"], "up");
        assert_eq!(json["dest_key"], "thumbnails/abc123.png");
        assert_eq!(json["new_size"], serde_json::json!([360, 200]));
        assert_eq!(json["acl"], "public-read");
    }
}
