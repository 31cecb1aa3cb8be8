//! Try-On Command Handlers
//!
//! GenerateTryOnHandler 负责整条编排：暂存 → 提交 → 组装结果，
//! 失败时对远端已暂存资源做尽力清理后原样抛出错误

use futures_util::future::join_all;
use std::sync::Arc;

use crate::application::commands::tryon_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    InferenceJobPort, StorageBackendPort, StorageKind, StorageSelector, TryOnJobInput,
};
use crate::application::staging::stage_assets;
use crate::domain::tryon::{GarmentDescription, PredictionId, TryOnInput, TryOnResult};

/// GenerateTryOn Handler - 编排一次试衣生成
pub struct GenerateTryOnHandler {
    storage: StorageSelector,
    inference: Arc<dyn InferenceJobPort>,
}

impl GenerateTryOnHandler {
    pub fn new(storage: StorageSelector, inference: Arc<dyn InferenceJobPort>) -> Self {
        Self { storage, inference }
    }

    pub async fn handle(&self, cmd: GenerateTryOn) -> Result<GenerateTryOnResponse, ApplicationError> {
        // 任何上传之前先同步检查本地文件
        if !cmd.person_image_path.exists() {
            return Err(ApplicationError::validation("Person image file not found"));
        }
        if !cmd.garment_image_path.exists() {
            return Err(ApplicationError::validation("Garment image file not found"));
        }

        let backend = self.storage.active();
        let kind = backend.kind();

        tracing::info!(storage = ?kind, "Starting try-on prediction");

        let staged = match stage_assets(
            backend.as_ref(),
            &cmd.person_image_path,
            &cmd.garment_image_path,
        )
        .await
        {
            Ok(staged) => staged,
            Err(err) => {
                let (source, orphans) = err.into_parts();
                tracing::error!(error = %source, "Failed to stage input images");
                let urls: Vec<&str> = orphans.iter().map(|a| a.public_url.as_str()).collect();
                cleanup_remote(backend.as_ref(), &urls).await;
                return Err(source.into());
            }
        };

        let description = GarmentDescription::from_prompt(cmd.text_prompt.as_deref());
        let job_input = TryOnJobInput {
            garm_img: staged.garment.public_url.clone(),
            human_img: staged.person.public_url.clone(),
            garment_des: description.clone(),
        };

        tracing::info!(
            human_img = %job_input.human_img,
            garment_img = %job_input.garm_img,
            garment_description = %description,
            "Model input prepared"
        );

        let output_url = match self.inference.submit(&job_input).await {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(error = %err, "Try-on prediction failed");
                cleanup_remote(backend.as_ref(), &staged.public_urls()).await;
                return Err(err.into());
            }
        };

        tracing::info!(output = ?output_url, "Prediction completed successfully");

        Ok(GenerateTryOnResponse {
            result: TryOnResult {
                output_url,
                input: TryOnInput {
                    human_img: job_input.human_img,
                    garment_img: job_input.garm_img,
                    garment_description: description,
                },
            },
            storage: backend.describe(),
        })
    }
}

/// 只清理远端后端上的资源，本地回退的文件就是调用方的临时文件
async fn cleanup_remote(backend: &dyn StorageBackendPort, urls: &[&str]) {
    if backend.kind() != StorageKind::Remote || urls.is_empty() {
        return;
    }

    tracing::info!(count = urls.len(), "Cleaning up uploaded files due to error");

    let results = join_all(urls.iter().map(|url| backend.delete_file(url))).await;
    for (url, deleted) in urls.iter().zip(results) {
        if !deleted {
            tracing::warn!(url = %url, "Failed to clean up staged file");
        }
    }
}

/// CancelPrediction Handler - 取消远端任务
pub struct CancelPredictionHandler {
    inference: Arc<dyn InferenceJobPort>,
}

impl CancelPredictionHandler {
    pub fn new(inference: Arc<dyn InferenceJobPort>) -> Self {
        Self { inference }
    }

    pub async fn handle(
        &self,
        cmd: CancelPrediction,
    ) -> Result<CancelPredictionResponse, ApplicationError> {
        let id = PredictionId::new(cmd.prediction_id)?;
        let prediction = self.inference.cancel(&id).await.map_err(|e| {
            tracing::error!(prediction_id = %id, error = %e, "Error canceling prediction");
            e
        })?;

        tracing::info!(prediction_id = %id, status = prediction.status.as_str(), "Prediction canceled");

        Ok(CancelPredictionResponse { prediction })
    }
}
