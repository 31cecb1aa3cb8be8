//! Application State
//!
//! 包含所有 Command/Query Handlers 与上传设置

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{
    // Command handlers
    CancelPredictionHandler, GenerateTryOnHandler,
    // Query handlers
    GetPredictionStatusHandler, GetStorageInfoHandler,
    // Ports
    InferenceJobPort, StorageSelector,
};

/// HTTP 层设置
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// 临时上传目录，同时由 /uploads 静态路由对外提供
    pub upload_dir: PathBuf,
    pub max_file_size: u64,
    /// 错误响应是否附带内部细节
    pub expose_error_details: bool,
}

/// 应用状态
pub struct AppState {
    pub settings: HttpSettings,

    // ========== Command Handlers ==========
    pub generate_tryon_handler: GenerateTryOnHandler,
    pub cancel_prediction_handler: CancelPredictionHandler,

    // ========== Query Handlers ==========
    pub get_prediction_status_handler: GetPredictionStatusHandler,
    pub get_storage_info_handler: GetStorageInfoHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        storage: StorageSelector,
        inference: Arc<dyn InferenceJobPort>,
        settings: HttpSettings,
    ) -> Self {
        Self {
            settings,

            // Command handlers
            generate_tryon_handler: GenerateTryOnHandler::new(storage.clone(), inference.clone()),
            cancel_prediction_handler: CancelPredictionHandler::new(inference.clone()),

            // Query handlers
            get_prediction_status_handler: GetPredictionStatusHandler::new(inference),
            get_storage_info_handler: GetStorageInfoHandler::new(storage),
        }
    }
}
