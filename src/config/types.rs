//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Replicate 推理服务配置
    #[serde(default)]
    pub replicate: ReplicateConfig,

    /// Firebase / Cloud Storage 配置
    #[serde(default)]
    pub firebase: FirebaseConfig,

    /// 上传配置
    #[serde(default)]
    pub upload: UploadConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    /// 非生产模式下才向调用方暴露内部错误细节
    pub fn exposes_error_details(&self) -> bool {
        *self != RunMode::Production
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（本地回退时推理服务从这里下载图片）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 运行模式
    #[serde(default)]
    pub environment: RunMode,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            environment: RunMode::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// Replicate 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicateConfig {
    /// API token
    #[serde(default)]
    pub api_token: String,

    /// API 基础 URL
    #[serde(default = "default_replicate_api_base")]
    pub api_base: String,

    /// 模型引用 owner/name:version
    #[serde(default = "default_replicate_model")]
    pub model: String,

    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// 单次请求超时（秒）
    #[serde(default = "default_replicate_timeout")]
    pub timeout_secs: u64,
}

fn default_replicate_api_base() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_replicate_model() -> String {
    crate::infrastructure::adapters::replicate::DEFAULT_MODEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_replicate_timeout() -> u64 {
    60
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_base: default_replicate_api_base(),
            model: default_replicate_model(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_replicate_timeout(),
        }
    }
}

/// Firebase Service Account 配置
///
/// project_id / private_key / client_email / storage_bucket 全部非空时启用远端存储
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub private_key_id: String,

    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub client_email: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub storage_bucket: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// Storage JSON API 地址
    #[serde(default = "default_storage_api")]
    pub api_base: String,

    /// 公网 URL 前缀
    #[serde(default = "default_storage_api")]
    pub public_base: String,

    /// 请求超时（秒）
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_storage_api() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_storage_timeout() -> u64 {
    60
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            private_key_id: String::new(),
            private_key: String::new(),
            client_email: String::new(),
            client_id: String::new(),
            storage_bucket: String::new(),
            token_uri: default_token_uri(),
            api_base: default_storage_api(),
            public_base: default_storage_api(),
            timeout_secs: default_storage_timeout(),
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 临时文件目录（同时作为 /uploads 静态目录）
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,

    /// 单个文件最大大小（字节），默认 10MB
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
