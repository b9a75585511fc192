use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use tracing::{debug, info};
use ureq::Agent;

use super::Rehoster;
use crate::config::RehostConfig;
use crate::errors::{MacrodexError, Result};
use crate::net::http_agent;
use crate::storage::SeaOrmStorage;

/// gist 页面大小上限
const PAGE_LIMIT: u64 = 10 * 1024 * 1024;

/// 从渲染后的 gist 页面中取出指定评论里的图片地址（取最后一个）
pub fn extract_comment_image(html: &str, comment_id: i64) -> Option<String> {
    let selector = Selector::parse(&format!("#gistcomment-{} img", comment_id)).ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .last()
        .map(str::to_string)
}

/// GitHub gist 接口
#[async_trait]
pub trait GistApi: Send + Sync {
    /// 新建公开 gist，返回 id
    async fn create_gist(&self) -> Result<String>;
    /// 发表评论，返回评论 id
    async fn create_comment(&self, gist_id: &str, body: &str) -> Result<i64>;
    /// 渲染后的 gist 页面
    async fn gist_page(&self, gist_id: &str) -> Result<String>;
}

pub struct GitHubGistApi {
    agent: &'static Agent,
    config: RehostConfig,
}

impl GitHubGistApi {
    pub fn new(config: RehostConfig, timeout_secs: u64) -> Self {
        Self {
            agent: http_agent(timeout_secs),
            config,
        }
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.github_user, self.config.github_token);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    async fn post_json(&self, url: String, payload: Value) -> Result<Value> {
        let agent = self.agent;
        let authorization = self.authorization();

        tokio::task::spawn_blocking(move || -> Result<Value> {
            let resp = agent
                .post(&url)
                .header("Authorization", &authorization)
                .header("Accept", "application/vnd.github.v3+json")
                .send_json(&payload)
                .map_err(|e| MacrodexError::transient(format!("POST {} failed: {}", url, e)))?;

            let status = resp.status().as_u16();
            if status >= 400 {
                return Err(MacrodexError::transient(format!(
                    "POST {} returned HTTP {}",
                    url, status
                )));
            }

            resp.into_body()
                .read_json()
                .map_err(|e| MacrodexError::transient(format!("bad response from {}: {}", url, e)))
        })
        .await
        .map_err(|e| MacrodexError::transient(format!("gist task failed: {}", e)))?
    }
}

#[async_trait]
impl GistApi for GitHubGistApi {
    async fn create_gist(&self) -> Result<String> {
        let now = Utc::now();
        let file_name = now.timestamp_nanos_opt().unwrap_or_default().to_string();
        let mut files = serde_json::Map::new();
        files.insert(file_name, json!({ "content": format!("created on {}", now) }));
        let payload = json!({ "public": true, "files": files });

        let resp = self
            .post_json(format!("{}/gists", self.config.api_base), payload)
            .await?;
        resp.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MacrodexError::transient("gist response has no id"))
    }

    async fn create_comment(&self, gist_id: &str, body: &str) -> Result<i64> {
        let resp = self
            .post_json(
                format!("{}/gists/{}/comments", self.config.api_base, gist_id),
                json!({ "body": body }),
            )
            .await?;

        resp.get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| MacrodexError::transient("comment response has no id"))
    }

    async fn gist_page(&self, gist_id: &str) -> Result<String> {
        let agent = self.agent;
        let url = format!(
            "{}/{}/{}",
            self.config.gist_web_base.trim_end_matches('/'),
            self.config.github_user,
            gist_id
        );

        tokio::task::spawn_blocking(move || -> Result<String> {
            let resp = agent
                .get(&url)
                .call()
                .map_err(|e| MacrodexError::transient(format!("GET {} failed: {}", url, e)))?;

            let status = resp.status().as_u16();
            if status >= 400 {
                return Err(MacrodexError::transient(format!(
                    "GET {} returned HTTP {}",
                    url, status
                )));
            }

            resp.into_body()
                .with_config()
                .limit(PAGE_LIMIT)
                .read_to_string()
                .map_err(|e| MacrodexError::transient(format!("reading {} failed: {}", url, e)))
        })
        .await
        .map_err(|e| MacrodexError::transient(format!("gist task failed: {}", e)))?
    }
}

pub struct GistRehoster {
    api: Arc<dyn GistApi>,
    storage: Arc<SeaOrmStorage>,
    max_comments: i32,
}

impl GistRehoster {
    pub fn new(storage: Arc<SeaOrmStorage>, config: RehostConfig, timeout_secs: u64) -> Self {
        let max_comments = config.max_comments_per_gist;
        Self::with_api(
            storage,
            Arc::new(GitHubGistApi::new(config, timeout_secs)),
            max_comments,
        )
    }

    pub fn with_api(storage: Arc<SeaOrmStorage>, api: Arc<dyn GistApi>, max_comments: i32) -> Self {
        Self {
            api,
            storage,
            max_comments,
        }
    }

    /// 最新的 gist 评论数未超上限就复用，否则新建一个并记入账本
    pub async fn current_gist(&self) -> Result<String> {
        if let Some(gist) = self
            .storage
            .latest_gist()
            .await?
            .filter(|g| g.comments <= self.max_comments)
        {
            return Ok(gist.id);
        }

        let id = self.api.create_gist().await?;
        self.storage.insert_gist(&id).await?;
        info!("Created scratch gist {}", id);
        Ok(id)
    }
}

#[async_trait]
impl Rehoster for GistRehoster {
    async fn rehost(&self, temp_url: &str) -> Result<String> {
        let gist_id = self.current_gist().await?;
        let comment_id = self
            .api
            .create_comment(&gist_id, &format!("![ghm]({})", temp_url))
            .await?;
        self.storage.increment_gist_comments(&gist_id).await?;

        let html = self.api.gist_page(&gist_id).await?;

        let cdn_url = extract_comment_image(&html, comment_id).ok_or_else(|| {
            MacrodexError::transient(format!(
                "image of comment {} not found on gist {}",
                comment_id, gist_id
            ))
        })?;

        debug!("Rehosted {} -> {}", temp_url, cdn_url);
        Ok(cdn_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="gistcomment-41"><p><img src="https://camo.example/old.png"></p></div>
          <div id="gistcomment-42" class="comment">
            <div class="comment-body">
              <p><a href="x"><img src="https://user-images.githubusercontent.com/1/abc.png" alt="ghm"></a></p>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_comment_image() {
        assert_eq!(
            extract_comment_image(PAGE, 42).as_deref(),
            Some("https://user-images.githubusercontent.com/1/abc.png")
        );
        assert_eq!(
            extract_comment_image(PAGE, 41).as_deref(),
            Some("https://camo.example/old.png")
        );
    }

    #[test]
    fn test_extract_missing_comment() {
        assert_eq!(extract_comment_image(PAGE, 7), None);
        assert_eq!(extract_comment_image("<html></html>", 42), None);
    }
}
