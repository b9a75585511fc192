use std::str::FromStr;

use tracing::warn;

use crate::storage::{EntryState, MacroEntry};
use migration::entities::macro_entry;

/// 将 Sea-ORM Model 转换为 MacroEntry
pub fn model_to_entry(model: macro_entry::Model) -> MacroEntry {
    let state = EntryState::from_str(&model.state).unwrap_or_else(|_| {
        warn!(
            "Unknown state '{}' on macro '{}', treating as ready",
            model.state, model.name
        );
        EntryState::Ready
    });

    MacroEntry {
        name: model.name,
        url: model.url,
        original_url: model.orig_url,
        url_size: model.url_size.max(0) as u64,
        thumbnail_url: model.thumbnail,
        thumbnail_size: model.thumbnail_size.max(0) as u64,
        is_animated: model.is_gif,
        animated_thumbnail_url: model.gif_thumbnail,
        animated_thumbnail_size: model.gif_thumbnail_size.map(|s| s.max(0) as u64),
        width: model.width.map(|w| w.clamp(0, u32::MAX as i64) as u32),
        height: model.height.map(|h| h.clamp(0, u32::MAX as i64) as u32),
        state,
        created_at: model.created_at,
    }
}

/// 将 MacroEntry 转换为 ActiveModel
///
/// `is_new` 为 false 时不覆盖 name 以外的创建信息（created_at）。
pub fn entry_to_active_model(entry: &MacroEntry, is_new: bool) -> macro_entry::ActiveModel {
    use sea_orm::ActiveValue::*;

    macro_entry::ActiveModel {
        name: Set(entry.name.clone()),
        url: Set(entry.url.clone()),
        orig_url: Set(entry.original_url.clone()),
        url_size: Set(entry.url_size as i64),
        thumbnail: Set(entry.thumbnail_url.clone()),
        thumbnail_size: Set(entry.thumbnail_size as i64),
        is_gif: Set(entry.is_animated),
        gif_thumbnail: Set(entry.animated_thumbnail_url.clone()),
        gif_thumbnail_size: Set(entry.animated_thumbnail_size.map(|s| s as i64)),
        width: Set(entry.width.map(i64::from)),
        height: Set(entry.height.map(i64::from)),
        state: Set(entry.state.as_ref().to_string()),
        created_at: if is_new { Set(entry.created_at) } else { NotSet },
    }
}
