//! Try-On HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::application::{
    CancelPrediction, GenerateTryOn, GetPredictionStatus, GetStorageInfo,
};
use crate::domain::tryon::ImageMime;
use crate::infrastructure::http::dto::{
    ApiResponse, CancelPredictionData, GenerateTryOnData, PredictionData, TryOnHealthData,
    SERVICE_VERSION,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::http::upload::{read_tryon_form, TryOnForm};

const INVALID_FILE_TYPE: &str = "Invalid file type. Only JPEG, PNG, and WebP images are allowed.";

/// 生成试衣图
///
/// 读表单、编排与临时文件清理在独立任务中运行，客户端断开不会中断清理
pub async fn generate_tryon(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<GenerateTryOnData>>, ApiError> {
    let data = tokio::spawn(generate_detached(state, multipart))
        .await
        .map_err(|e| ApiError::Internal {
            error: "Failed to generate virtual try-on".to_string(),
            details: Some(e.to_string()),
        })??;

    Ok(Json(ApiResponse::success(data)))
}

async fn generate_detached(
    state: Arc<AppState>,
    mut multipart: Multipart,
) -> Result<GenerateTryOnData, ApiError> {
    let form = read_tryon_form(
        &mut multipart,
        &state.settings.upload_dir,
        state.settings.max_file_size,
    )
    .await?;

    let outcome = run_generate(&state, &form).await;
    form.cleanup().await;
    outcome
}

async fn run_generate(state: &AppState, form: &TryOnForm) -> Result<GenerateTryOnData, ApiError> {
    let (person, garment) = match (&form.person, &form.garment) {
        (Some(person), Some(garment)) => (person, garment),
        _ => {
            return Err(ApiError::BadRequest(
                "Both person image and garment image are required".to_string(),
            ))
        }
    };

    // 类型校验必须先于任何暂存
    for image in [person, garment] {
        if let Err(e) = ImageMime::parse(&image.mime) {
            tracing::warn!(error = %e, "Rejected upload");
            return Err(ApiError::BadRequest(INVALID_FILE_TYPE.to_string()));
        }
    }

    tracing::info!(
        person_image = ?person.original_name,
        garment_image = ?garment.original_name,
        text_prompt = form.text_prompt.as_deref().unwrap_or("None"),
        "Processing try-on request"
    );

    let command = GenerateTryOn {
        person_image_path: person.path.clone(),
        garment_image_path: garment.path.clone(),
        text_prompt: form.text_prompt.clone(),
    };

    let response = state
        .generate_tryon_handler
        .handle(command)
        .await
        .map_err(|e| {
            ApiError::from_application(
                e,
                "Failed to generate virtual try-on",
                state.settings.expose_error_details,
            )
        })?;

    Ok(GenerateTryOnData {
        output_url: response.result.output_url,
        input: response.result.input,
        storage: response.storage,
        message: "Virtual try-on generated successfully",
    })
}

/// 查询远端任务状态
pub async fn prediction_status(
    State(state): State<Arc<AppState>>,
    Path(prediction_id): Path<String>,
) -> Result<Json<ApiResponse<PredictionData>>, ApiError> {
    let prediction = state
        .get_prediction_status_handler
        .handle(GetPredictionStatus { prediction_id })
        .await
        .map_err(|e| {
            ApiError::from_application(
                e,
                "Failed to get prediction status",
                state.settings.expose_error_details,
            )
        })?;

    Ok(Json(ApiResponse::success(prediction.into())))
}

/// 取消远端任务
pub async fn cancel_prediction(
    State(state): State<Arc<AppState>>,
    Path(prediction_id): Path<String>,
) -> Result<Json<ApiResponse<CancelPredictionData>>, ApiError> {
    let result = state
        .cancel_prediction_handler
        .handle(CancelPrediction { prediction_id })
        .await
        .map_err(|e| {
            ApiError::from_application(
                e,
                "Failed to cancel prediction",
                state.settings.expose_error_details,
            )
        })?;

    Ok(Json(ApiResponse::success(CancelPredictionData {
        prediction: result.prediction.into(),
        message: "Prediction canceled successfully",
    })))
}

/// 试衣服务健康检查，附带当前存储后端
pub async fn tryon_health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<TryOnHealthData>> {
    Json(ApiResponse::success(TryOnHealthData {
        status: "healthy",
        message: "Try-on service is healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: SERVICE_VERSION,
        storage: state.get_storage_info_handler.handle(GetStorageInfo),
    }))
}
