//! Inference Job Port - 远端推理任务抽象
//!
//! 远端排队与执行对本服务不透明，只暴露提交、查询、取消

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::tryon::{GarmentDescription, OutputUrl, PredictionId};

/// 远端任务错误
#[derive(Debug, Error)]
pub enum RemoteJobError {
    #[error("Replicate API token not configured")]
    MissingToken,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Replicate API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Prediction {id} failed: {error}")]
    PredictionFailed { id: String, error: String },

    #[error("Prediction {0} was canceled")]
    PredictionCanceled(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 推理任务输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryOnJobInput {
    pub garm_img: String,
    pub human_img: String,
    pub garment_des: GarmentDescription,
}

/// 远端任务状态
///
/// 未知状态保留原始字符串，除 starting/processing 之外一律视为终态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Starting | Self::Processing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "starting" => Self::Starting,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// 远端任务快照，总是实时从提供方获取
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Inference Job Port
#[async_trait]
pub trait InferenceJobPort: Send + Sync {
    /// 提交并等待任务进入终态，成功时返回模型输出
    async fn submit(&self, input: &TryOnJobInput) -> Result<OutputUrl, RemoteJobError>;

    async fn get_status(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError>;

    async fn cancel(&self, id: &PredictionId) -> Result<Prediction, RemoteJobError>;
}
