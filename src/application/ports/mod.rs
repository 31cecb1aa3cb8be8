//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod inference_job;
mod storage_backend;

pub use inference_job::{
    InferenceJobPort, JobStatus, Prediction, RemoteJobError, TryOnJobInput,
};
pub use storage_backend::{
    select_backend, EndpointInfo, StorageBackendPort, StorageDescriptor, StorageError,
    StorageKind, StorageSelector,
};
