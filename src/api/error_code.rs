//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::MacrodexError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，与现有客户端约定的取值保持一致（6 已废弃）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    EmptyName = 1,
    NameContainsSpaces = 2,
    NameAlreadyExist = 3,
    EmptyURL = 4,
    InvalidURL = 5,
    FileIsTooBig = 7,
    FileFormatNotSupported = 8,
    TransientError = 9,
    MissingMandatoryFields = 10,
    InfraFailure = 11,
    PermanentError = 12,
    NotFound = 13,
}

impl From<&MacrodexError> for ErrorCode {
    fn from(err: &MacrodexError) -> Self {
        match err {
            MacrodexError::EmptyName(_) => ErrorCode::EmptyName,
            MacrodexError::NameContainsSpaces(_) => ErrorCode::NameContainsSpaces,
            MacrodexError::NameAlreadyExists(_) => ErrorCode::NameAlreadyExist,
            MacrodexError::EmptyUrl(_) => ErrorCode::EmptyURL,
            MacrodexError::InvalidUrl(_) => ErrorCode::InvalidURL,
            MacrodexError::FileTooBig(_) => ErrorCode::FileIsTooBig,
            MacrodexError::UnsupportedFormat(_) => ErrorCode::FileFormatNotSupported,
            MacrodexError::MissingField(_) => ErrorCode::MissingMandatoryFields,
            MacrodexError::NotFound(_) => ErrorCode::NotFound,
            MacrodexError::Transient(_) => ErrorCode::TransientError,
            MacrodexError::Database(_)
            | MacrodexError::BlobStore(_)
            | MacrodexError::Queue(_)
            | MacrodexError::Config(_) => ErrorCode::InfraFailure,
            MacrodexError::PermanentContent(_) => ErrorCode::PermanentError,
        }
    }
}

impl From<MacrodexError> for ErrorCode {
    fn from(err: MacrodexError) -> Self {
        ErrorCode::from(&err)
    }
}
