//! 公开对象存储
//!
//! 对象以随机 UUID 命名，公开地址为 `{public_base_url}/{key}`。

mod filesystem;
mod s3_store;

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::config::{BlobBackend, BlobConfig};
use crate::errors::Result;

pub use filesystem::FilesystemBlobStore;
pub use s3_store::S3BlobStore;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    fn name(&self) -> &'static str;
}

/// 拼接公开地址
pub fn join_public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// 对象 key 只允许 UUID 文件名，防止路径穿越
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !key.starts_with('.')
        && !key.contains("..")
}

/// 统计写入字节数的 Writer
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// 编码产物：字节与精确大小
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    pub bytes: Bytes,
    pub size: u64,
}

/// 通过计数 Writer 执行编码
pub fn encode_counted<F>(encode: F) -> Result<EncodedArtifact>
where
    F: FnOnce(&mut CountingWriter<Vec<u8>>) -> Result<()>,
{
    let mut writer = CountingWriter::new(Vec::new());
    encode(&mut writer)?;
    let size = writer.count();
    Ok(EncodedArtifact {
        bytes: Bytes::from(writer.into_inner()),
        size,
    })
}

/// 已发布对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedObject {
    pub key: String,
    pub url: String,
    pub size: u64,
}

/// 对象发布器
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn BlobStore>,
}

impl Publisher {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub async fn publish(&self, artifact: EncodedArtifact, extension: &str) -> Result<PublishedObject> {
        let key = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        let content_type = content_type_for(extension);

        self.store
            .put(&key, artifact.bytes, content_type)
            .await?;

        let url = self.store.public_url(&key);
        debug!(
            "Published {} ({} bytes) to {} store",
            key,
            artifact.size,
            self.store.name()
        );

        Ok(PublishedObject {
            key,
            url,
            size: artifact.size,
        })
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// 根据配置创建对象存储
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::Filesystem => Arc::new(FilesystemBlobStore::new(
            &config.root,
            &config.public_base_url,
        )?),
        BlobBackend::S3 => Arc::new(S3BlobStore::new(&config.s3, &config.public_base_url)?),
    };
    Ok(store)
}
