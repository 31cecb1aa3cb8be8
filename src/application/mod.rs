//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（StorageBackend、InferenceJob）
//! - staging: 两张输入图片的并发暂存
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    // Try-on commands
    CancelPrediction,
    CancelPredictionResponse,
    GenerateTryOn,
    GenerateTryOnResponse,
    // Handlers
    handlers::{CancelPredictionHandler, GenerateTryOnHandler},
};

pub use error::ApplicationError;

pub use ports::{
    // Storage backend
    select_backend,
    EndpointInfo,
    StorageBackendPort,
    StorageDescriptor,
    StorageError,
    StorageKind,
    StorageSelector,
    // Inference job
    InferenceJobPort,
    JobStatus,
    Prediction,
    RemoteJobError,
    TryOnJobInput,
};

pub use queries::{
    // Prediction queries
    GetPredictionStatus,
    GetStorageInfo,
    // Handlers
    handlers::{GetPredictionStatusHandler, GetStorageInfoHandler},
};

pub use staging::{stage_assets, StagedPair, StagingError};
