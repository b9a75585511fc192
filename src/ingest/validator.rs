//! 入口校验：纯函数，不做 I/O

use crate::errors::{MacrodexError, Result};

/// 校验名字与 URL
///
/// 检查顺序：名字为空 → URL 为空 → 名字含空白。
pub fn validate_intake(name: &str, url: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MacrodexError::empty_name("macro name is empty"));
    }

    if url.is_empty() {
        return Err(MacrodexError::empty_url("macro url is empty"));
    }

    if name.chars().any(char::is_whitespace) {
        return Err(MacrodexError::name_contains_spaces(format!(
            "macro name '{}' contains whitespace",
            name
        )));
    }

    Ok(())
}
