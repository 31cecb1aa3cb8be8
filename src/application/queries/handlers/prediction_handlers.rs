//! Prediction Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{InferenceJobPort, Prediction, StorageDescriptor, StorageSelector};
use crate::application::queries::prediction_queries::{GetPredictionStatus, GetStorageInfo};
use crate::domain::tryon::PredictionId;

/// GetPredictionStatus Handler
///
/// 不缓存任何任务状态，每次都向提供方实时查询
pub struct GetPredictionStatusHandler {
    inference: Arc<dyn InferenceJobPort>,
}

impl GetPredictionStatusHandler {
    pub fn new(inference: Arc<dyn InferenceJobPort>) -> Self {
        Self { inference }
    }

    pub async fn handle(&self, query: GetPredictionStatus) -> Result<Prediction, ApplicationError> {
        let id = PredictionId::new(query.prediction_id)?;

        self.inference.get_status(&id).await.map_err(|e| {
            tracing::error!(prediction_id = %id, error = %e, "Error getting prediction status");
            ApplicationError::from(e)
        })
    }
}

/// GetStorageInfo Handler
pub struct GetStorageInfoHandler {
    storage: StorageSelector,
}

impl GetStorageInfoHandler {
    pub fn new(storage: StorageSelector) -> Self {
        Self { storage }
    }

    pub fn handle(&self, _query: GetStorageInfo) -> StorageDescriptor {
        self.storage.active().describe()
    }
}
