//! Gist rehost tests
//!
//! GitHub 接口用桩替换，账本使用临时 SQLite。

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use macrodex::errors::Result;
use macrodex::ingest::{GistApi, GistRehoster, Rehoster};
use macrodex::storage::SeaOrmStorage;

use common::create_temp_storage;

const MAX_COMMENTS: i32 = 95;

/// 记录新建的 gist 与评论，页面按评论渲染图片
#[derive(Default)]
struct StubGistApi {
    created: AtomicUsize,
    comments: Mutex<Vec<(String, i64)>>,
}

impl StubGistApi {
    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GistApi for StubGistApi {
    async fn create_gist(&self) -> Result<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("gist-{}", n))
    }

    async fn create_comment(&self, gist_id: &str, _body: &str) -> Result<i64> {
        let mut comments = self.comments.lock().unwrap();
        let id = 1000 + comments.len() as i64;
        comments.push((gist_id.to_string(), id));
        Ok(id)
    }

    async fn gist_page(&self, gist_id: &str) -> Result<String> {
        let comments = self.comments.lock().unwrap();
        let body: String = comments
            .iter()
            .filter(|(gist, _)| gist == gist_id)
            .map(|(_, id)| {
                format!(
                    r#"<div id="gistcomment-{id}"><p><img src="https://user-images.githubusercontent.com/g/{id}.png"></p></div>"#
                )
            })
            .collect();
        Ok(format!("<html><body>{}</body></html>", body))
    }
}

async fn add_comments(storage: &SeaOrmStorage, gist_id: &str, n: usize) {
    for _ in 0..n {
        storage.increment_gist_comments(gist_id).await.unwrap();
    }
}

#[tokio::test]
async fn test_gist_reused_up_to_comment_limit() {
    let (storage, _dir) = create_temp_storage().await;
    let api = Arc::new(StubGistApi::default());
    let rehoster = GistRehoster::with_api(storage.clone(), api.clone(), MAX_COMMENTS);

    storage.insert_gist("scratch").await.unwrap();
    add_comments(&storage, "scratch", 95).await;

    assert_eq!(rehoster.current_gist().await.unwrap(), "scratch");
    assert_eq!(api.created(), 0);
}

#[tokio::test]
async fn test_gist_rolls_over_past_comment_limit() {
    let (storage, _dir) = create_temp_storage().await;
    let api = Arc::new(StubGistApi::default());
    let rehoster = GistRehoster::with_api(storage.clone(), api.clone(), MAX_COMMENTS);

    storage.insert_gist("scratch").await.unwrap();
    add_comments(&storage, "scratch", 96).await;

    let id = rehoster.current_gist().await.unwrap();
    assert_eq!(id, "gist-1");
    assert_eq!(api.created(), 1);

    let latest = storage.latest_gist().await.unwrap().expect("ledger row");
    assert_eq!(latest.id, "gist-1");
    assert_eq!(latest.comments, 0);

    // 新 gist 之后继续复用
    assert_eq!(rehoster.current_gist().await.unwrap(), "gist-1");
    assert_eq!(api.created(), 1);
}

#[tokio::test]
async fn test_rehost_posts_comment_and_scrapes_page() {
    let (storage, _dir) = create_temp_storage().await;
    let api = Arc::new(StubGistApi::default());
    let rehoster = GistRehoster::with_api(storage.clone(), api.clone(), MAX_COMMENTS);

    // 账本为空时新建
    let first = rehoster
        .rehost("http://127.0.0.1:8080/blobs/a.jpeg")
        .await
        .unwrap();
    assert_eq!(first, "https://user-images.githubusercontent.com/g/1000.png");
    assert_eq!(api.created(), 1);

    let second = rehoster
        .rehost("http://127.0.0.1:8080/blobs/b.jpeg")
        .await
        .unwrap();
    assert_eq!(second, "https://user-images.githubusercontent.com/g/1001.png");
    assert_eq!(api.created(), 1);

    let latest = storage.latest_gist().await.unwrap().unwrap();
    assert_eq!(latest.comments, 2);
}
