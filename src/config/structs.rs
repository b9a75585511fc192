use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 对象存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlobBackend {
    #[default]
    Filesystem,
    S3,
}

/// 重托管信号队列后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QueueBackend {
    #[default]
    Memory,
    Redis,
}

/// 应用配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - ingest: 探测与缩略图预算
/// - compression: 外部有损压缩服务
/// - blob: 对象存储
/// - rehost: gist 重托管
/// - queue: 重托管信号队列
/// - reports: 举报阈值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub rehost: RehostConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：MDX，分隔符：__
    /// 示例：MDX__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("MDX")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ingest.self_hosted_domains")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 是否在 serve 模式下同时启动进程内重托管 worker
    #[serde(default = "default_true")]
    pub embedded_worker: bool,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

/// 入库探测与缩略图预算（字节）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_probe_bytes")]
    pub probe_bytes: u64,
    #[serde(default = "default_thumbnail_max_size")]
    pub thumbnail_max_size: u64,
    #[serde(default = "default_thumbnail_fallback_max_size")]
    pub thumbnail_fallback_max_size: u64,
    #[serde(default = "default_animated_thumbnail_max_size")]
    pub animated_thumbnail_max_size: u64,
    /// 缩略图长边像素
    #[serde(default = "default_thumbnail_edge")]
    pub thumbnail_edge: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 视为自托管的媒体域名后缀，这类内容走异步重托管
    #[serde(default = "default_self_hosted_domains")]
    pub self_hosted_domains: Vec<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// 外部有损压缩服务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_compression_api_url")]
    pub api_url: String,
    #[serde(default = "default_compression_quality")]
    pub quality: u8,
}

/// 对象存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(default)]
    pub backend: BlobBackend,
    /// filesystem 后端的根目录
    #[serde(default = "default_blob_root")]
    pub root: String,
    /// 公开访问前缀，对象 URL 为 {public_base_url}/{key}
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub s3: S3Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// 自定义 endpoint（MinIO 等），设置后使用 path-style
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// gist 重托管配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehostConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_github_user")]
    pub github_user: String,
    #[serde(default)]
    pub github_token: String,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_gist_web_base")]
    pub gist_web_base: String,
    #[serde(default = "default_max_comments_per_gist")]
    pub max_comments_per_gist: i32,
    #[serde(default = "default_processing_deadline_secs")]
    pub processing_deadline_secs: u64,
}

/// 重托管信号队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_queue_key")]
    pub key: String,
    /// memory 后端的通道容量
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_report_threshold")]
    pub threshold: i64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "macros.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_probe_bytes() -> u64 {
    512
}

fn default_thumbnail_max_size() -> u64 {
    400 * 1024
}

fn default_thumbnail_fallback_max_size() -> u64 {
    1536 * 1024
}

fn default_animated_thumbnail_max_size() -> u64 {
    700 * 1024
}

fn default_thumbnail_edge() -> u32 {
    150
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_self_hosted_domains() -> Vec<String> {
    vec!["githubusercontent.com".to_string()]
}

fn default_http_timeout_secs() -> u64 {
    20
}

fn default_compression_api_url() -> String {
    "https://api.resmush.it/ws.php".to_string()
}

fn default_compression_quality() -> u8 {
    50
}

fn default_blob_root() -> String {
    "blobs".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080/blobs".to_string()
}

fn default_s3_region() -> String {
    "us-east-1".to_string()
}

fn default_github_user() -> String {
    "githubmacros".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_gist_web_base() -> String {
    "https://gist.github.com".to_string()
}

fn default_max_comments_per_gist() -> i32 {
    95
}

fn default_processing_deadline_secs() -> u64 {
    60
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_queue_key() -> String {
    "macrodex:rehost".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_report_threshold() -> i64 {
    50
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            embedded_worker: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            probe_bytes: default_probe_bytes(),
            thumbnail_max_size: default_thumbnail_max_size(),
            thumbnail_fallback_max_size: default_thumbnail_fallback_max_size(),
            animated_thumbnail_max_size: default_animated_thumbnail_max_size(),
            thumbnail_edge: default_thumbnail_edge(),
            jpeg_quality: default_jpeg_quality(),
            self_hosted_domains: default_self_hosted_domains(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_compression_api_url(),
            quality: default_compression_quality(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            root: default_blob_root(),
            public_base_url: default_public_base_url(),
            s3: S3Config::default(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_s3_region(),
            endpoint: None,
        }
    }
}

impl Default for RehostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            github_user: default_github_user(),
            github_token: String::new(),
            api_base: default_github_api_base(),
            gist_web_base: default_gist_web_base(),
            max_comments_per_gist: default_max_comments_per_gist(),
            processing_deadline_secs: default_processing_deadline_secs(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            redis_url: default_redis_url(),
            key: default_queue_key(),
            capacity: default_queue_capacity(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            threshold: default_report_threshold(),
        }
    }
}
