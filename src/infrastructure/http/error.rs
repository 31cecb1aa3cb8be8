//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ports::RemoteJobError;
use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
    /// 仅在非生产模式下返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
            details,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 上传内容不合规，details 总是返回给调用方
    InvalidUpload {
        error: String,
        details: String,
    },
    NotFound(String),
    Internal {
        error: String,
        details: Option<String>,
    },
    /// 远端推理服务失败
    BadGateway {
        error: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// 把应用层错误映射为 HTTP 错误
    ///
    /// `context` 是面向调用方的概括信息，原始错误只在 `expose_details` 时放进 details
    pub fn from_application(err: ApplicationError, context: &str, expose_details: bool) -> Self {
        let details = expose_details.then(|| err.to_string());
        match err {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::RemoteJob(RemoteJobError::ApiError { status: 404, .. }) => {
                ApiError::NotFound("Prediction not found".to_string())
            }
            ApplicationError::RemoteJob(_) => ApiError::BadGateway {
                error: context.to_string(),
                details,
            },
            ApplicationError::Storage(_) | ApplicationError::InternalError(_) => ApiError::Internal {
                error: context.to_string(),
                details,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, response) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(errno::BAD_REQUEST, msg, None),
                )
            }
            ApiError::InvalidUpload { error, details } => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %error, details = %details, "Invalid upload");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(errno::BAD_REQUEST, error, Some(details)),
                )
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(errno::NOT_FOUND, msg, None),
                )
            }
            ApiError::Internal { error, details } => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %error, details = ?details, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(errno::INTERNAL_ERROR, error, details),
                )
            }
            ApiError::BadGateway { error, details } => {
                tracing::error!(errno = errno::BAD_GATEWAY, error = %error, details = ?details, "Upstream service error");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(errno::BAD_GATEWAY, error, details),
                )
            }
        };

        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StorageError;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::from_application(
            ApplicationError::validation("Prediction ID is required"),
            "Failed to get prediction status",
            true,
        );
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Prediction ID is required"));
    }

    #[test]
    fn test_remote_job_details_only_outside_production() {
        let remote = || {
            ApplicationError::RemoteJob(RemoteJobError::PredictionFailed {
                id: "p1".to_string(),
                error: "boom".to_string(),
            })
        };

        match ApiError::from_application(remote(), "Failed to generate virtual try-on", true) {
            ApiError::BadGateway { error, details } => {
                assert_eq!(error, "Failed to generate virtual try-on");
                assert_eq!(details.as_deref(), Some("Prediction p1 failed: boom"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        match ApiError::from_application(remote(), "Failed to generate virtual try-on", false) {
            ApiError::BadGateway { details, .. } => assert!(details.is_none()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_prediction_maps_to_not_found() {
        let err = ApiError::from_application(
            ApplicationError::RemoteJob(RemoteJobError::ApiError {
                status: 404,
                message: "Not found.".to_string(),
            }),
            "Failed to get prediction status",
            true,
        );
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_maps_to_internal() {
        let err = ApiError::from_application(
            ApplicationError::Storage(StorageError::NotInitialized),
            "Failed to generate virtual try-on",
            false,
        );
        assert!(matches!(err, ApiError::Internal { details: None, .. }));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
