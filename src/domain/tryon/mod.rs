//! Try-On Context - 虚拟试衣限界上下文
//!
//! 职责:
//! - 输入图片类型校验
//! - 服装描述默认值
//! - 推理输出 / 暂存资源的值对象

mod errors;
mod value_objects;

pub use errors::TryOnError;
pub use value_objects::{
    GarmentDescription, ImageMime, OutputUrl, PredictionId, StagedAsset, TryOnInput, TryOnResult,
    DEFAULT_GARMENT_DESCRIPTION,
};
