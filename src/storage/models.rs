use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 持久化的条目状态：pending 表示等待异步重托管
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryState {
    Pending,
    #[default]
    Ready,
}

/// 一条宏：名称 + 可访问的主图 + 缩略图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEntry {
    pub name: String,
    pub url: String,
    pub original_url: String,
    pub url_size: u64,
    pub thumbnail_url: String,
    pub thumbnail_size: u64,
    pub is_animated: bool,
    pub animated_thumbnail_url: Option<String>,
    pub animated_thumbnail_size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub state: EntryState,
    pub created_at: DateTime<Utc>,
}

impl MacroEntry {
    /// 以 `source` 的全部产物字段创建一个新名字的副本
    pub fn clone_as(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// 带使用次数的查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroRecord {
    #[serde(flatten)]
    pub entry: MacroEntry,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub directs: i64,
}

impl MacroRecord {
    pub fn usages(&self) -> i64 {
        self.clicks + self.directs
    }
}

/// 使用次数触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UsageTrigger {
    Click,
    Direct,
}

/// 重托管用的 gist 账本记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistRecord {
    pub id: String,
    pub comments: i32,
    pub created_at: DateTime<Utc>,
}

/// 客户端上报的错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientErrorType {
    Js,
    Net,
}

#[derive(Debug, Clone)]
pub struct ClientErrorReport {
    pub client_version: String,
    pub error_type: ClientErrorType,
    pub stacktrace: String,
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_entry_state_strings() {
        assert_eq!(EntryState::Pending.as_ref(), "pending");
        assert_eq!(EntryState::from_str("ready").unwrap(), EntryState::Ready);
        assert!(EntryState::from_str("gone").is_err());
    }

    #[test]
    fn test_usage_trigger_parse() {
        assert_eq!(UsageTrigger::from_str("click").unwrap(), UsageTrigger::Click);
        assert_eq!(UsageTrigger::from_str("direct").unwrap(), UsageTrigger::Direct);
        assert!(UsageTrigger::from_str("hover").is_err());
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = MacroRecord {
            entry: MacroEntry {
                name: "lgtm".to_string(),
                url: "https://cdn/x.png".to_string(),
                original_url: "https://src/x.png".to_string(),
                url_size: 10,
                thumbnail_url: "https://cdn/x.png".to_string(),
                thumbnail_size: 10,
                is_animated: false,
                animated_thumbnail_url: None,
                animated_thumbnail_size: None,
                width: None,
                height: None,
                state: EntryState::Ready,
                created_at: Utc::now(),
            },
            clicks: 2,
            directs: 3,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "lgtm");
        assert_eq!(value["clicks"], 2);
        assert_eq!(record.usages(), 5);
    }
}
