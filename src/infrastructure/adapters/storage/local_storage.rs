//! Local Storage - 本地静态文件回退
//!
//! 文件留在上传目录原地，由 `/uploads` 静态路由对外提供

use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::{
    EndpointInfo, StorageBackendPort, StorageDescriptor, StorageError, StorageKind,
};

/// 本地回退后端
pub struct LocalStorageBackend {
    /// 例如 http://localhost:3000/uploads
    uploads_url: String,
}

impl LocalStorageBackend {
    /// `public_base_url` 是本服务对外可访问的地址
    pub fn new(public_base_url: &str) -> Self {
        Self {
            uploads_url: format!("{}/uploads", public_base_url.trim_end_matches('/')),
        }
    }

    pub fn uploads_url(&self) -> &str {
        &self.uploads_url
    }
}

#[async_trait]
impl StorageBackendPort for LocalStorageBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        _name: Option<&str>,
    ) -> Result<String, StorageError> {
        if !local_path.exists() {
            return Err(StorageError::FileNotFound(
                local_path.to_string_lossy().to_string(),
            ));
        }

        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StorageError::IoError(format!("Invalid file name: {}", local_path.display()))
            })?;

        let public_url = format!("{}/{}", self.uploads_url, file_name);
        tracing::info!(url = %public_url, "Image served locally");

        Ok(public_url)
    }

    async fn delete_file(&self, public_url: &str) -> bool {
        tracing::debug!(url = %public_url, "Local storage does not own a copy, skipping delete");
        false
    }

    fn describe(&self) -> StorageDescriptor {
        StorageDescriptor {
            kind: StorageKind::Local,
            configured: true,
            initialized: true,
            endpoint: EndpointInfo::Url {
                url: self.uploads_url.clone(),
            },
        }
    }
}
