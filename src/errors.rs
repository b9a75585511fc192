use std::fmt;

/// 错误大类，决定重试策略与对外错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 调用方输入问题，不重试
    Client,
    /// 网络抖动、外部服务暂时不可用
    Transient,
    /// 数据库、对象存储、队列等基础设施故障
    Infra,
    /// 内容本身损坏或无法满足体积约束
    Permanent,
}

#[derive(Debug, Clone)]
pub enum MacrodexError {
    EmptyName(String),
    NameContainsSpaces(String),
    NameAlreadyExists(String),
    EmptyUrl(String),
    InvalidUrl(String),
    FileTooBig(String),
    UnsupportedFormat(String),
    MissingField(String),
    NotFound(String),
    Transient(String),
    Database(String),
    BlobStore(String),
    Queue(String),
    Config(String),
    PermanentContent(String),
}

impl MacrodexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MacrodexError::EmptyName(_)
            | MacrodexError::NameContainsSpaces(_)
            | MacrodexError::NameAlreadyExists(_)
            | MacrodexError::EmptyUrl(_)
            | MacrodexError::InvalidUrl(_)
            | MacrodexError::FileTooBig(_)
            | MacrodexError::UnsupportedFormat(_)
            | MacrodexError::MissingField(_)
            | MacrodexError::NotFound(_) => ErrorKind::Client,
            MacrodexError::Transient(_) => ErrorKind::Transient,
            MacrodexError::Database(_)
            | MacrodexError::BlobStore(_)
            | MacrodexError::Queue(_)
            | MacrodexError::Config(_) => ErrorKind::Infra,
            MacrodexError::PermanentContent(_) => ErrorKind::Permanent,
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            MacrodexError::EmptyName(_) => "Empty Name",
            MacrodexError::NameContainsSpaces(_) => "Name Contains Spaces",
            MacrodexError::NameAlreadyExists(_) => "Name Already Exists",
            MacrodexError::EmptyUrl(_) => "Empty URL",
            MacrodexError::InvalidUrl(_) => "Invalid URL",
            MacrodexError::FileTooBig(_) => "File Too Big",
            MacrodexError::UnsupportedFormat(_) => "Unsupported Format",
            MacrodexError::MissingField(_) => "Missing Mandatory Field",
            MacrodexError::NotFound(_) => "Resource Not Found",
            MacrodexError::Transient(_) => "Transient Error",
            MacrodexError::Database(_) => "Database Error",
            MacrodexError::BlobStore(_) => "Blob Store Error",
            MacrodexError::Queue(_) => "Queue Error",
            MacrodexError::Config(_) => "Configuration Error",
            MacrodexError::PermanentContent(_) => "Permanent Content Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            MacrodexError::EmptyName(msg)
            | MacrodexError::NameContainsSpaces(msg)
            | MacrodexError::NameAlreadyExists(msg)
            | MacrodexError::EmptyUrl(msg)
            | MacrodexError::InvalidUrl(msg)
            | MacrodexError::FileTooBig(msg)
            | MacrodexError::UnsupportedFormat(msg)
            | MacrodexError::MissingField(msg)
            | MacrodexError::NotFound(msg)
            | MacrodexError::Transient(msg)
            | MacrodexError::Database(msg)
            | MacrodexError::BlobStore(msg)
            | MacrodexError::Queue(msg)
            | MacrodexError::Config(msg)
            | MacrodexError::PermanentContent(msg) => msg,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for MacrodexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MacrodexError {}

// 便捷的构造函数
impl MacrodexError {
    pub fn empty_name<T: Into<String>>(msg: T) -> Self {
        MacrodexError::EmptyName(msg.into())
    }

    pub fn name_contains_spaces<T: Into<String>>(msg: T) -> Self {
        MacrodexError::NameContainsSpaces(msg.into())
    }

    pub fn name_already_exists<T: Into<String>>(msg: T) -> Self {
        MacrodexError::NameAlreadyExists(msg.into())
    }

    pub fn empty_url<T: Into<String>>(msg: T) -> Self {
        MacrodexError::EmptyUrl(msg.into())
    }

    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        MacrodexError::InvalidUrl(msg.into())
    }

    pub fn file_too_big<T: Into<String>>(msg: T) -> Self {
        MacrodexError::FileTooBig(msg.into())
    }

    pub fn unsupported_format<T: Into<String>>(msg: T) -> Self {
        MacrodexError::UnsupportedFormat(msg.into())
    }

    pub fn missing_field<T: Into<String>>(msg: T) -> Self {
        MacrodexError::MissingField(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        MacrodexError::NotFound(msg.into())
    }

    pub fn transient<T: Into<String>>(msg: T) -> Self {
        MacrodexError::Transient(msg.into())
    }

    pub fn database<T: Into<String>>(msg: T) -> Self {
        MacrodexError::Database(msg.into())
    }

    pub fn blob_store<T: Into<String>>(msg: T) -> Self {
        MacrodexError::BlobStore(msg.into())
    }

    pub fn queue<T: Into<String>>(msg: T) -> Self {
        MacrodexError::Queue(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        MacrodexError::Config(msg.into())
    }

    pub fn permanent_content<T: Into<String>>(msg: T) -> Self {
        MacrodexError::PermanentContent(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for MacrodexError {
    fn from(err: sea_orm::DbErr) -> Self {
        MacrodexError::Database(err.to_string())
    }
}

impl From<std::io::Error> for MacrodexError {
    fn from(err: std::io::Error) -> Self {
        MacrodexError::BlobStore(err.to_string())
    }
}

impl From<serde_json::Error> for MacrodexError {
    fn from(err: serde_json::Error) -> Self {
        MacrodexError::Transient(format!("unexpected response body: {}", err))
    }
}

impl From<image::ImageError> for MacrodexError {
    fn from(err: image::ImageError) -> Self {
        MacrodexError::PermanentContent(err.to_string())
    }
}

impl From<redis::RedisError> for MacrodexError {
    fn from(err: redis::RedisError) -> Self {
        MacrodexError::Queue(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MacrodexError>;
