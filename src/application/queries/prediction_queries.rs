//! Prediction Queries - 远端任务与存储状态查询

/// 查询远端任务状态
#[derive(Debug, Clone)]
pub struct GetPredictionStatus {
    pub prediction_id: String,
}

/// 查询当前存储后端
#[derive(Debug, Clone, Copy)]
pub struct GetStorageInfo;
