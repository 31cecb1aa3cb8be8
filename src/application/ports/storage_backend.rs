//! Storage Backend Port - 出站端口
//!
//! 把本地文件暂存为公网可访问 URL，并在需要时删除

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File does not exist: {0}")]
    FileNotFound(String),

    #[error("Storage backend not initialized")]
    NotInitialized,

    #[error("Storage authentication failed: {0}")]
    AuthError(String),

    #[error("Failed to upload file to storage: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Remote,
    Local,
}

/// 后端端点信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EndpointInfo {
    /// 已初始化的远端 bucket
    Bucket {
        #[serde(rename = "name")]
        bucket: String,
        #[serde(rename = "projectId")]
        project_id: String,
    },
    /// 本地静态文件服务地址
    Url { url: String },
    /// 远端未就绪时的说明
    Message { message: String },
}

/// 当前存储后端的只读快照，每次请求重新计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageDescriptor {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    pub configured: bool,
    pub initialized: bool,
    #[serde(flatten)]
    pub endpoint: EndpointInfo,
}

/// Storage Backend Port
///
/// 远端对象存储与本地静态服务两种实现
#[async_trait]
pub trait StorageBackendPort: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// 配置是否齐全（每次调用都重新计算）
    fn is_configured(&self) -> bool;

    /// 上传本地文件，返回公网 URL
    ///
    /// `name` 为空时由后端生成唯一名称
    async fn upload_file(&self, local_path: &Path, name: Option<&str>)
        -> Result<String, StorageError>;

    /// 尽力删除，任何失败都返回 false 而不是报错
    async fn delete_file(&self, public_url: &str) -> bool;

    fn describe(&self) -> StorageDescriptor;
}

/// 选择当前生效的后端
///
/// 远端配置齐全时用远端，否则回退到本地
pub fn select_backend(
    remote: &Arc<dyn StorageBackendPort>,
    local: &Arc<dyn StorageBackendPort>,
) -> Arc<dyn StorageBackendPort> {
    if remote.is_configured() {
        remote.clone()
    } else {
        local.clone()
    }
}

/// 持有两种后端，按请求选择
#[derive(Clone)]
pub struct StorageSelector {
    remote: Arc<dyn StorageBackendPort>,
    local: Arc<dyn StorageBackendPort>,
}

impl StorageSelector {
    pub fn new(remote: Arc<dyn StorageBackendPort>, local: Arc<dyn StorageBackendPort>) -> Self {
        Self { remote, local }
    }

    pub fn active(&self) -> Arc<dyn StorageBackendPort> {
        select_backend(&self.remote, &self.local)
    }
}
