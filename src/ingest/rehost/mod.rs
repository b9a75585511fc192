//! 重托管：把临时地址的媒体转存到 GitHub CDN
//!
//! 具体做法是在一个公共 gist 下发表带图片的评论，再从渲染后的页面里取出 CDN 地址。

mod gist;
mod signal;
mod worker;

use async_trait::async_trait;

use crate::errors::Result;

pub use gist::{GistApi, GistRehoster, GitHubGistApi, extract_comment_image};
pub use signal::{MemoryQueue, RedisQueue, RehostSignal, SignalQueue, create_signal_queue, emit_with_retry};
pub use worker::{RehostWorker, WorkerOutcome};

#[async_trait]
pub trait Rehoster: Send + Sync {
    /// 返回持久的 CDN 地址
    async fn rehost(&self, temp_url: &str) -> Result<String>;
}

/// 关闭重托管时使用，原样返回
pub struct PassthroughRehoster;

#[async_trait]
impl Rehoster for PassthroughRehoster {
    async fn rehost(&self, temp_url: &str) -> Result<String> {
        Ok(temp_url.to_string())
    }
}
