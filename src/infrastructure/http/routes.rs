//! HTTP Routes
//!
//! API Endpoints:
//! - /                                  GET     服务索引
//! - /health                            GET     进程存活检查
//! - /api/tryon/generate                POST    生成试衣图（multipart）
//! - /api/tryon/status/:prediction_id   GET     查询远端任务状态
//! - /api/tryon/cancel/:prediction_id   DELETE  取消远端任务
//! - /api/tryon/health                  GET     试衣服务健康检查
//! - /uploads/*                         GET     上传目录静态文件（本地回退）

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(upload_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .fallback(handlers::not_found)
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/tryon", tryon_routes())
}

/// Try-On 路由
fn tryon_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_tryon))
        .route("/status/:prediction_id", get(handlers::prediction_status))
        .route("/cancel/:prediction_id", delete(handlers::cancel_prediction))
        .route("/health", get(handlers::tryon_health))
}
