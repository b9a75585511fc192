use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::debug;

use super::{BlobStore, join_public_url};
use crate::config::S3Config;
use crate::errors::{MacrodexError, Result};

/// S3 兼容对象存储
///
/// 凭证走默认链：环境变量 → ~/.aws/credentials → 实例元数据。
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(config: &S3Config, public_base_url: &str) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(MacrodexError::config("blob.s3.bucket 未设置"));
        }

        let credentials = Credentials::default()
            .map_err(|e| MacrodexError::config(format!("无法加载 S3 凭证: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|_| MacrodexError::config(format!("无效的 S3 region: {}", config.region)))?,
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| MacrodexError::config(format!("无法创建 S3 bucket: {}", e)))?;

        // MinIO 等自定义 endpoint 使用 path-style
        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            bucket,
            public_base_url: public_base_url.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &content, content_type)
            .await
            .map_err(|e| MacrodexError::blob_store(format!("上传对象 {} 失败: {}", key, e)))?;

        if response.status_code() >= 300 {
            return Err(MacrodexError::blob_store(format!(
                "上传对象 {} 返回状态码 {}",
                key,
                response.status_code()
            )));
        }

        debug!(key = %key, "S3 put object successful");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base_url, key)
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
