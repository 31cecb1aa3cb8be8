//! Try-On Commands - 虚拟试衣相关命令

use std::path::PathBuf;

use crate::application::ports::{Prediction, StorageDescriptor};
use crate::domain::tryon::TryOnResult;

/// 生成试衣图命令
///
/// 两个路径都是调用方持有的本地临时文件，处理结束后由调用方删除
#[derive(Debug, Clone)]
pub struct GenerateTryOn {
    pub person_image_path: PathBuf,
    pub garment_image_path: PathBuf,
    pub text_prompt: Option<String>,
}

/// 生成试衣图响应
#[derive(Debug, Clone)]
pub struct GenerateTryOnResponse {
    pub result: TryOnResult,
    pub storage: StorageDescriptor,
}

/// 取消远端任务命令
#[derive(Debug, Clone)]
pub struct CancelPrediction {
    pub prediction_id: String,
}

/// 取消结果（远端返回的任务快照）
#[derive(Debug, Clone)]
pub struct CancelPredictionResponse {
    pub prediction: Prediction,
}
