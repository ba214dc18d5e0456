use crate::config::StoreConfig;
use crate::types::RawObjectMeta;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Object store operations the pipeline depends on.
///
/// `delete` deliberately returns nothing: cleanup is best-effort and must
/// never mask the failure that triggered it. It is also idempotent, so
/// deleting an already-removed object is safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read content type and size for an object.
    async fn head(&self, bucket: &str, key: &str) -> Result<RawObjectMeta>;

    /// Remove an object. Errors are logged and swallowed.
    async fn delete(&self, bucket: &str, key: &str);

    /// Produce a time-limited read URL for an object.
    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String>;

    /// Server-side copy within the store.
    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()>;

    /// Upload bytes under the given key with a canned ACL.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: &str,
    ) -> Result<()>;
}

/// S3-backed gateway
pub struct S3Gateway {
    client: S3Client,
}

impl S3Gateway {
    /// Create a new S3 gateway
    pub async fn new(config: &StoreConfig) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        // Force path-style access for MinIO compatibility
        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        info!(region = %config.region, "S3 gateway initialized");

        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStore for S3Gateway {
    async fn head(&self, bucket: &str, key: &str) -> Result<RawObjectMeta> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to read object metadata for {bucket}/{key}"))?;

        Ok(RawObjectMeta {
            content_type: response.content_type().map(String::from),
            size_bytes: response.content_length(),
        })
    }

    async fn delete(&self, bucket: &str, key: &str) {
        match self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => debug!(bucket = %bucket, key = %key, "Object deleted"),
            Err(e) => warn!(
                bucket = %bucket,
                key = %key,
                error = %e,
                "Failed to delete object; continuing"
            ),
        }
    }

    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String> {
        let presigning_config =
            PresigningConfig::expires_in(ttl).context("Failed to create presigning config")?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .with_context(|| format!("Failed to presign read for {bucket}/{key}"))?;

        Ok(presigned.uri().to_string())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        self.client
            .copy_object()
            .copy_source(format!("{src_bucket}/{src_key}"))
            .bucket(dst_bucket)
            .key(dst_key)
            .send()
            .await
            .with_context(|| {
                format!("Failed to copy {src_bucket}/{src_key} to {dst_bucket}/{dst_key}")
            })?;

        debug!(
            src = %format!("{src_bucket}/{src_key}"),
            dst = %format!("{dst_bucket}/{dst_key}"),
            "Object copied"
        );
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: &str,
    ) -> Result<()> {
        let size_bytes = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::from(acl))
            .send()
            .await
            .with_context(|| format!("Failed to upload {bucket}/{key}"))?;

        debug!(bucket = %bucket, key = %key, size_bytes, "Object uploaded");
        Ok(())
    }
}
