//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{RemoteJobError, StorageError};
use crate::domain::tryon::TryOnError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入校验错误（发生在任何 I/O 之前）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 存储错误（上传失败）
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 远端推理错误，原样透传
    #[error(transparent)]
    RemoteJob(#[from] RemoteJobError),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<TryOnError> for ApplicationError {
    fn from(err: TryOnError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
