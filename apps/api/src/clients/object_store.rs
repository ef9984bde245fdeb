use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::ObjectStore;
use crate::config::StorageConfig;

/// S3-compatible storage (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    endpoint: String,
}

impl S3ObjectStore {
    pub async fn connect(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "resume-api-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // MinIO only serves path-style bucket addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, object_id: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_id)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload of {object_id} failed: {e}"))?;
        Ok(())
    }

    async fn access_link(&self, object_id: &str, ttl: Duration) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(ttl).context("invalid link lifetime")?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_id)
            .presigned(presigning)
            .await
            .map_err(|e| anyhow::anyhow!("presigning {object_id} failed: {e}"))?;
        Ok(request.uri().to_string())
    }

    async fn delete(&self, object_id: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_id)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 delete of {object_id} failed: {e}"))?;
        Ok(())
    }

    fn object_url(&self, object_id: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, object_id)
    }
}
