//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

mod common;

use chrono::Utc;
use macrodex::storage::backend::{PAGE_SIZE, infer_backend_from_url};
use macrodex::storage::{
    ClientErrorReport, ClientErrorType, EntryState, InsertOutcome, MacroEntry, UsageTrigger,
};

use common::create_temp_storage;

fn create_test_entry(name: &str, original_url: &str) -> MacroEntry {
    MacroEntry {
        name: name.to_string(),
        url: format!("https://cdn.example.com/{}.png", name),
        original_url: original_url.to_string(),
        url_size: 2048,
        thumbnail_url: format!("https://cdn.example.com/{}.png", name),
        thumbnail_size: 2048,
        is_animated: false,
        animated_thumbnail_url: None,
        animated_thumbnail_size: None,
        width: Some(64),
        height: Some(32),
        state: EntryState::Ready,
        created_at: Utc::now(),
    }
}

// =============================================================================
// URL 推断
// =============================================================================

#[test]
fn test_infer_backend_from_url() {
    assert_eq!(infer_backend_from_url("sqlite://test.db").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url("macros.db").unwrap(), "sqlite");
    assert_eq!(infer_backend_from_url("mysql://u@h/db").unwrap(), "mysql");
    assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
    assert_eq!(infer_backend_from_url("postgresql://u@h/db").unwrap(), "postgres");
    assert!(infer_backend_from_url("ftp://nope").is_err());
}

// =============================================================================
// 插入与唯一性
// =============================================================================

#[tokio::test]
async fn test_insert_and_get() {
    let (storage, _dir) = create_temp_storage().await;

    let entry = create_test_entry("lgtm", "https://src.example.com/lgtm.png");
    assert_eq!(storage.insert_new(&entry).await.unwrap(), InsertOutcome::Inserted);

    let loaded = storage.get("lgtm").await.unwrap().expect("entry should exist");
    assert_eq!(loaded.url, entry.url);
    assert_eq!(loaded.original_url, entry.original_url);
    assert_eq!(loaded.width, Some(64));
    assert_eq!(loaded.state, EntryState::Ready);
    assert_eq!(storage.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_existing_name_is_rejected() {
    let (storage, _dir) = create_temp_storage().await;

    let first = create_test_entry("shipit", "https://a.example.com/1.png");
    let mut second = create_test_entry("shipit", "https://b.example.com/2.png");
    second.url = "https://cdn.example.com/other.png".to_string();

    assert_eq!(storage.insert_new(&first).await.unwrap(), InsertOutcome::Inserted);
    assert_eq!(storage.insert_new(&second).await.unwrap(), InsertOutcome::NameTaken);

    // 原条目不被覆盖
    let loaded = storage.get("shipit").await.unwrap().unwrap();
    assert_eq!(loaded.url, first.url);
}

#[tokio::test]
async fn test_concurrent_insert_single_winner() {
    let (storage, _dir) = create_temp_storage().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let entry = create_test_entry("race", &format!("https://src.example.com/{}.png", i));
            storage.insert_new(&entry).await.unwrap()
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap() == InsertOutcome::Inserted {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);
    assert_eq!(storage.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_find_by_original_url_ignores_pending() {
    let (storage, _dir) = create_temp_storage().await;

    let mut pending = create_test_entry("pending", "https://src.example.com/p.png");
    pending.state = EntryState::Pending;
    storage.insert_new(&pending).await.unwrap();

    assert!(
        storage
            .find_by_original_url("https://src.example.com/p.png")
            .await
            .unwrap()
            .is_none()
    );

    let mut ready = pending.clone();
    ready.state = EntryState::Ready;
    assert!(storage.finalize(&ready).await.unwrap());

    let found = storage
        .find_by_original_url("https://src.example.com/p.png")
        .await
        .unwrap()
        .expect("ready entry should be found");
    assert_eq!(found.name, "pending");
}

#[tokio::test]
async fn test_finalize_missing_row_returns_false() {
    let (storage, _dir) = create_temp_storage().await;
    let entry = create_test_entry("ghost", "https://src.example.com/ghost.png");
    assert!(!storage.finalize(&entry).await.unwrap());
    assert!(storage.get("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete() {
    let (storage, _dir) = create_temp_storage().await;
    storage
        .insert_new(&create_test_entry("gone", "https://src.example.com/g.png"))
        .await
        .unwrap();

    assert!(storage.delete("gone").await.unwrap());
    assert!(!storage.delete("gone").await.unwrap());
    assert!(storage.get("gone").await.unwrap().is_none());
}

// =============================================================================
// 计数器
// =============================================================================

#[tokio::test]
async fn test_usage_counters() {
    let (storage, _dir) = create_temp_storage().await;
    storage
        .insert_new(&create_test_entry("party", "https://src.example.com/party.png"))
        .await
        .unwrap();

    assert!(storage.record_usage("party", UsageTrigger::Click).await.unwrap());
    assert!(storage.record_usage("party", UsageTrigger::Click).await.unwrap());
    assert!(storage.record_usage("party", UsageTrigger::Direct).await.unwrap());
    assert_eq!(storage.usage("party").await.unwrap(), (2, 1));

    assert!(!storage.record_usage("missing", UsageTrigger::Click).await.unwrap());
    assert_eq!(storage.usage("missing").await.unwrap(), (0, 0));
}

#[tokio::test]
async fn test_report_counters_and_purge() {
    let (storage, _dir) = create_temp_storage().await;
    storage
        .insert_new(&create_test_entry("broken", "https://src.example.com/broken.png"))
        .await
        .unwrap();

    assert_eq!(storage.increment_reports("broken").await.unwrap(), Some(1));
    assert_eq!(storage.increment_reports("broken").await.unwrap(), Some(2));
    assert_eq!(storage.increment_reports("nope").await.unwrap(), None);

    storage.reset_reports("broken").await.unwrap();
    assert_eq!(storage.report_count("broken").await.unwrap(), 0);

    storage.record_usage("broken", UsageTrigger::Click).await.unwrap();
    storage.purge("broken").await.unwrap();
    assert!(storage.get("broken").await.unwrap().is_none());
    assert_eq!(storage.usage("broken").await.unwrap(), (0, 0));
    assert_eq!(storage.report_count("broken").await.unwrap(), 0);
}

// =============================================================================
// 查询
// =============================================================================

#[tokio::test]
async fn test_search_orders_by_usage_and_pages() {
    let (storage, _dir) = create_temp_storage().await;

    let total = PAGE_SIZE + 5;
    for i in 0..total {
        let name = format!("cat{:02}", i);
        storage
            .insert_new(&create_test_entry(&name, &format!("https://src.example.com/{}.png", name)))
            .await
            .unwrap();
    }
    storage
        .insert_new(&create_test_entry("dog", "https://src.example.com/dog.png"))
        .await
        .unwrap();

    for _ in 0..3 {
        storage.record_usage("cat07", UsageTrigger::Direct).await.unwrap();
    }

    let first = storage.search("cat", 0).await.unwrap();
    assert_eq!(first.items.len() as u64, PAGE_SIZE);
    assert!(first.has_more);
    assert_eq!(first.items[0].entry.name, "cat07");
    assert_eq!(first.items[0].usages(), 3);

    let second = storage.search("cat", 1).await.unwrap();
    assert_eq!(second.items.len() as u64, total - PAGE_SIZE);
    assert!(!second.has_more);
    assert!(second.items.iter().all(|r| r.entry.name.starts_with("cat")));
}

#[tokio::test]
async fn test_suggestions_skip_pending() {
    let (storage, _dir) = create_temp_storage().await;

    storage
        .insert_new(&create_test_entry("visible", "https://src.example.com/v.png"))
        .await
        .unwrap();
    let mut hidden = create_test_entry("hidden", "https://src.example.com/h.png");
    hidden.state = EntryState::Pending;
    storage.insert_new(&hidden).await.unwrap();

    let page = storage.suggestions(0).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|r| r.entry.name.as_str()).collect();
    assert_eq!(names, vec!["visible"]);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_get_many() {
    let (storage, _dir) = create_temp_storage().await;
    for name in ["a", "b", "c"] {
        storage
            .insert_new(&create_test_entry(name, &format!("https://src.example.com/{}.png", name)))
            .await
            .unwrap();
    }

    let names = vec!["c".to_string(), "a".to_string(), "zzz".to_string()];
    let records = storage.get_many(&names).await.unwrap();
    let found: Vec<_> = records.iter().map(|r| r.entry.name.as_str()).collect();
    assert_eq!(found, vec!["a", "c"]);

    assert!(storage.get_many(&[]).await.unwrap().is_empty());
}

// =============================================================================
// gist 账本与客户端错误
// =============================================================================

#[tokio::test]
async fn test_gist_ledger() {
    let (storage, _dir) = create_temp_storage().await;
    assert!(storage.latest_gist().await.unwrap().is_none());

    storage.insert_gist("abc123").await.unwrap();
    storage.increment_gist_comments("abc123").await.unwrap();
    storage.increment_gist_comments("abc123").await.unwrap();

    let latest = storage.latest_gist().await.unwrap().unwrap();
    assert_eq!(latest.id, "abc123");
    assert_eq!(latest.comments, 2);
}

#[tokio::test]
async fn test_client_error_log() {
    let (storage, _dir) = create_temp_storage().await;
    storage
        .insert_client_error(&ClientErrorReport {
            client_version: "1.4.2".to_string(),
            error_type: ClientErrorType::Js,
            stacktrace: "TypeError: x is undefined".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(storage.client_error_count().await.unwrap(), 1);
}
