use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{BlobStore, join_public_url};
use crate::errors::{MacrodexError, Result};

/// 本地目录存储，由 HTTP 服务在 /blobs/{key} 下提供访问
pub struct FilesystemBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemBlobStore {
    pub fn new(root: &str, public_base_url: &str) -> Result<Self> {
        let root = PathBuf::from(root);
        std::fs::create_dir_all(&root).map_err(|e| {
            MacrodexError::blob_store(format!(
                "无法创建对象存储目录 {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            public_base_url: public_base_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, content: Bytes, _content_type: &str) -> Result<()> {
        let path = self.root.join(key);
        tokio::fs::write(&path, &content).await.map_err(|e| {
            MacrodexError::blob_store(format!("写入对象 {} 失败: {}", path.display(), e))
        })
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base_url, key)
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
