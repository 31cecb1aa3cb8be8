//! Data Transfer Objects

use serde::Serialize;
use serde_json::Value;

use crate::application::ports::{Prediction, StorageDescriptor};
use crate::domain::tryon::{OutputUrl, TryOnInput};

/// 对外公布的服务版本
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 未匹配路由的响应，附带请求方法与路径
#[derive(Debug, Serialize)]
pub struct RouteNotFoundResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
    pub path: String,
    pub method: String,
}

// ============================================================================
// Try-On DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTryOnData {
    pub output_url: OutputUrl,
    pub input: TryOnInput,
    pub storage: StorageDescriptor,
    pub message: &'static str,
}

/// 远端任务快照
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionData {
    pub id: String,
    pub status: String,
    pub output: Option<Value>,
    pub error: Option<Value>,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<Prediction> for PredictionData {
    fn from(p: Prediction) -> Self {
        Self {
            id: p.id,
            status: p.status.into(),
            output: p.output,
            error: p.error,
            created_at: p.created_at,
            completed_at: p.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelPredictionData {
    pub prediction: PredictionData,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TryOnHealthData {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub storage: StorageDescriptor,
}

// ============================================================================
// Service DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexData {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointsData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsData {
    pub health: &'static str,
    pub try_on: TryOnEndpoints,
}

#[derive(Debug, Serialize)]
pub struct TryOnEndpoints {
    pub generate: &'static str,
    pub status: &'static str,
    pub cancel: &'static str,
    pub health: &'static str,
}
