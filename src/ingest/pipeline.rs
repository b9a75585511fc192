//! 入库流水线
//!
//! `Candidate → Probed → Synthesized → PendingRehost → Rehosted | Abandoned`
//!
//! 自托管域名的内容先以 pending 状态入库并发出重托管信号，其余内容在请求内完成
//! 合成与重托管后再入库。两条路径共用 [`IngestPipeline::synthesize_and_rehost`]。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::dedup::{DedupDecision, dedup_key, resolve_duplicates};
use super::prober::{ProbedContent, probe_content};
use super::rehost::{Rehoster, RehostSignal, SignalQueue, emit_with_retry};
use super::thumbnail::{ThumbnailSet, ThumbnailSynthesizer};
use super::validator::validate_intake;
use crate::config::IngestConfig;
use crate::errors::{MacrodexError, Result};
use crate::net::MediaFetcher;
use crate::storage::{EntryState, InsertOutcome, MacroEntry, SeaOrmStorage};

/// 入库状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroState {
    Candidate,
    Probed,
    Synthesized,
    PendingRehost,
    Rehosted,
    Abandoned,
}

/// 重托管失败的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RehostPolicy {
    /// 请求路径：失败即整体失败
    Inline,
    /// 异步路径：失败时保留临时地址
    Deferred,
}

/// 一次入库请求
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub name: String,
    pub url: String,
    pub original_url: Option<String>,
}

/// 入库相关参数
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_file_size: u64,
    pub probe_bytes: u64,
    pub self_hosted_domains: Vec<String>,
}

impl From<&IngestConfig> for PipelineSettings {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            probe_bytes: config.probe_bytes,
            self_hosted_domains: config.self_hosted_domains.clone(),
        }
    }
}

impl PipelineSettings {
    /// 主机名以任一自托管域名结尾
    pub fn is_self_hosted(&self, url: &str) -> bool {
        let host = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_ascii_lowercase(),
                None => return false,
            },
            Err(_) => return false,
        };

        self.self_hosted_domains
            .iter()
            .filter(|d| !d.is_empty())
            .any(|d| host.ends_with(&d.to_ascii_lowercase()))
    }
}

pub struct IngestPipeline {
    storage: Arc<SeaOrmStorage>,
    fetcher: Arc<dyn MediaFetcher>,
    synthesizer: ThumbnailSynthesizer,
    rehoster: Arc<dyn Rehoster>,
    queue: Arc<dyn SignalQueue>,
    settings: PipelineSettings,
}

impl IngestPipeline {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        fetcher: Arc<dyn MediaFetcher>,
        synthesizer: ThumbnailSynthesizer,
        rehoster: Arc<dyn Rehoster>,
        queue: Arc<dyn SignalQueue>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            storage,
            fetcher,
            synthesizer,
            rehoster,
            queue,
            settings,
        }
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    pub fn queue(&self) -> &Arc<dyn SignalQueue> {
        &self.queue
    }

    /// 完整入库流程
    pub async fn ingest(&self, request: &IngestRequest) -> Result<MacroEntry> {
        let name = request.name.as_str();
        let url = request.url.as_str();

        validate_intake(name, url)?;

        let original_url = dedup_key(url, request.original_url.as_deref()).to_string();

        if let DedupDecision::CloneOf(source) =
            resolve_duplicates(&self.storage, name, &original_url).await?
        {
            let clone = source.clone_as(name);
            self.insert_or_conflict(&clone).await?;
            info!("Macro '{}' cloned from '{}'", name, source.name);
            return Ok(clone);
        }

        let probed = probe_content(
            self.fetcher.as_ref(),
            url,
            self.settings.probe_bytes,
            self.settings.max_file_size,
        )
        .await?;
        trace_state(name, MacroState::Probed);

        let candidate = candidate_entry(name, url, &original_url, &probed);

        if self.settings.is_self_hosted(url) {
            self.ingest_deferred(candidate).await
        } else {
            self.ingest_inline(candidate).await
        }
    }

    async fn ingest_inline(&self, candidate: MacroEntry) -> Result<MacroEntry> {
        let entry = self
            .synthesize_and_rehost(candidate, RehostPolicy::Inline)
            .await?;
        self.insert_or_conflict(&entry).await?;
        info!("Macro '{}' ingested", entry.name);
        Ok(entry)
    }

    /// pending 入库 + 发信号；两次发送都失败则在请求内完成，完成失败则清除 pending 行及其计数
    async fn ingest_deferred(&self, candidate: MacroEntry) -> Result<MacroEntry> {
        self.insert_or_conflict(&candidate).await?;
        trace_state(&candidate.name, MacroState::PendingRehost);

        let signal = RehostSignal::new(&candidate.name);
        let emit_err = match emit_with_retry(self.queue.as_ref(), &signal).await {
            Ok(()) => {
                info!("Macro '{}' accepted, rehost deferred", candidate.name);
                return Ok(candidate);
            }
            Err(e) => e,
        };

        warn!(
            "Rehost signal for '{}' could not be emitted ({}), processing inline",
            candidate.name, emit_err
        );

        let name = candidate.name.clone();
        let completed = match self
            .synthesize_and_rehost(candidate, RehostPolicy::Inline)
            .await
        {
            Ok(entry) => self.storage.finalize(&entry).await.map(|_| entry),
            Err(e) => Err(e),
        };

        match completed {
            Ok(entry) => Ok(entry),
            Err(e) => {
                if let Err(del_err) = self.storage.purge(&name).await {
                    error!("Failed to remove pending macro '{}': {}", name, del_err);
                }
                trace_state(&name, MacroState::Abandoned);
                Err(e)
            }
        }
    }

    /// 异步路径：对 pending 行重新合成并重托管，然后标记为 ready
    pub async fn complete_pending(&self, entry: MacroEntry) -> Result<MacroEntry> {
        let entry = self
            .synthesize_and_rehost(entry, RehostPolicy::Deferred)
            .await?;

        if !self.storage.finalize(&entry).await? {
            return Err(MacrodexError::not_found(format!(
                "macro '{}' disappeared before finalize",
                entry.name
            )));
        }
        info!("Macro '{}' finalized", entry.name);
        Ok(entry)
    }

    /// 合成缩略图，再把主图与各缩略图重托管
    pub async fn synthesize_and_rehost(
        &self,
        mut entry: MacroEntry,
        policy: RehostPolicy,
    ) -> Result<MacroEntry> {
        let set = self
            .synthesizer
            .synthesize(&entry.url, entry.url_size, entry.is_animated)
            .await?;
        apply_thumbnails(&mut entry, set);
        trace_state(&entry.name, MacroState::Synthesized);

        match self.rehost_artifacts(&mut entry).await {
            Ok(()) => trace_state(&entry.name, MacroState::Rehosted),
            Err(e) => match policy {
                RehostPolicy::Inline => {
                    return Err(match e {
                        MacrodexError::Transient(_) => e,
                        other => MacrodexError::transient(format!("rehost failed: {}", other)),
                    });
                }
                RehostPolicy::Deferred => {
                    warn!(
                        "Rehost of '{}' failed, keeping temporary urls: {}",
                        entry.name, e
                    );
                }
            },
        }

        entry.state = EntryState::Ready;
        Ok(entry)
    }

    /// 主图与各缩略图都转存；相同地址只转存一次
    async fn rehost_artifacts(&self, entry: &mut MacroEntry) -> Result<()> {
        let mut rehosted: HashMap<String, String> = HashMap::new();

        let mut targets = vec![entry.url.clone(), entry.thumbnail_url.clone()];
        if let Some(animated) = &entry.animated_thumbnail_url {
            targets.push(animated.clone());
        }

        for url in targets {
            if url.is_empty() || rehosted.contains_key(&url) {
                continue;
            }
            let cdn_url = self.rehoster.rehost(&url).await?;
            rehosted.insert(url, cdn_url);
        }

        let replace = |url: &mut String| {
            if let Some(cdn_url) = rehosted.get(url.as_str()) {
                *url = cdn_url.clone();
            }
        };
        replace(&mut entry.url);
        replace(&mut entry.thumbnail_url);
        if let Some(animated) = entry.animated_thumbnail_url.as_mut() {
            replace(animated);
        }

        debug!("Rehosted {} artifact(s) of '{}'", rehosted.len(), entry.name);
        Ok(())
    }

    async fn insert_or_conflict(&self, entry: &MacroEntry) -> Result<()> {
        match self.storage.insert_new(entry).await? {
            InsertOutcome::Inserted => Ok(()),
            InsertOutcome::NameTaken => Err(MacrodexError::name_already_exists(format!(
                "macro '{}' already exists",
                entry.name
            ))),
        }
    }
}

fn trace_state(name: &str, state: MacroState) {
    debug!("Macro '{}' -> {:?}", name, state);
}

/// 探测完成、尚未合成的条目：缩略图暂用原图
fn candidate_entry(name: &str, url: &str, original_url: &str, probed: &ProbedContent) -> MacroEntry {
    let (width, height) = match probed.dimensions {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };

    MacroEntry {
        name: name.to_string(),
        url: url.to_string(),
        original_url: original_url.to_string(),
        url_size: probed.size,
        thumbnail_url: url.to_string(),
        thumbnail_size: probed.size,
        is_animated: probed.is_animated(),
        animated_thumbnail_url: None,
        animated_thumbnail_size: None,
        width,
        height,
        state: EntryState::Pending,
        created_at: Utc::now(),
    }
}

fn apply_thumbnails(entry: &mut MacroEntry, set: ThumbnailSet) {
    entry.url_size = set.source_size;
    entry.thumbnail_url = set.thumbnail_url;
    entry.thumbnail_size = set.thumbnail_size;
    entry.is_animated = set.is_animated;
    entry.animated_thumbnail_url = set.animated_url;
    entry.animated_thumbnail_size = set.animated_size;
    if set.width.is_some() {
        entry.width = set.width;
        entry.height = set.height;
    }
}
