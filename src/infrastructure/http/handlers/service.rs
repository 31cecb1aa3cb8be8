//! Service Handlers
//!
//! 服务索引、存活检查与未匹配路由

use axum::{
    extract::OriginalUri,
    http::{Method, StatusCode},
    Json,
};
use chrono::Utc;

use crate::infrastructure::http::dto::{
    ApiResponse, EndpointsData, HealthData, IndexData, RouteNotFoundResponse, TryOnEndpoints,
    SERVICE_VERSION,
};
use crate::infrastructure::http::error::errno;

/// 服务索引，列出可用接口
pub async fn index() -> Json<ApiResponse<IndexData>> {
    Json(ApiResponse::success(IndexData {
        message: "Virtual Try-On API",
        version: SERVICE_VERSION,
        endpoints: EndpointsData {
            health: "/health",
            try_on: TryOnEndpoints {
                generate: "POST /api/tryon/generate",
                status: "GET /api/tryon/status/:predictionId",
                cancel: "DELETE /api/tryon/cancel/:predictionId",
                health: "GET /api/tryon/health",
            },
        },
    }))
}

/// 进程存活检查
pub async fn health() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(HealthData {
        status: "healthy",
        message: "Server is running",
        timestamp: Utc::now().to_rfc3339(),
        version: SERVICE_VERSION,
    }))
}

/// 未匹配路由，嵌套路由下也返回完整的原始路径
pub async fn not_found(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<RouteNotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFoundResponse {
            errno: errno::NOT_FOUND,
            error: "Route not found".to_string(),
            data: None,
            path: uri.to_string(),
            method: method.to_string(),
        }),
    )
}
