//! Try-On Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::TryOnError;

/// 未提供描述时提交给模型的默认服装描述
pub const DEFAULT_GARMENT_DESCRIPTION: &str = "garment";

/// 服装描述
///
/// 构造时完成默认值替换，之后任何层都不会再看到空描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GarmentDescription(String);

impl GarmentDescription {
    /// 空字符串或 None 替换为 "garment"，其余原样保留
    pub fn from_prompt(prompt: Option<&str>) -> Self {
        match prompt {
            Some(text) if !text.is_empty() => Self(text.to_string()),
            _ => Self(DEFAULT_GARMENT_DESCRIPTION.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GARMENT_DESCRIPTION
    }
}

impl Default for GarmentDescription {
    fn default() -> Self {
        Self::from_prompt(None)
    }
}

impl std::fmt::Display for GarmentDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 允许上传的图片 MIME 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    /// 解析 MIME 类型，`image/jpg` 视为 `image/jpeg`
    pub fn parse(mime: &str) -> Result<Self, TryOnError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            _ => Err(TryOnError::UnsupportedImageType(mime.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// 远端推理任务 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionId(String);

impl PredictionId {
    pub fn new(id: impl Into<String>) -> Result<Self, TryOnError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TryOnError::EmptyPredictionId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PredictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 模型输出
///
/// 上游可能返回单个 URL，也可能返回 URL 数组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputUrl {
    Single(String),
    Many(Vec<String>),
}

impl OutputUrl {
    pub fn urls(&self) -> Vec<&str> {
        match self {
            Self::Single(url) => vec![url.as_str()],
            Self::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(url) => url.is_empty(),
            Self::Many(urls) => urls.is_empty(),
        }
    }
}

/// 已暂存到公网可访问位置的本地文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub local_path: PathBuf,
    pub public_url: String,
}

/// 提交给模型的输入（同时原样回显给调用方）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnInput {
    pub human_img: String,
    pub garment_img: String,
    pub garment_description: GarmentDescription,
}

/// 一次成功编排的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnResult {
    pub output_url: OutputUrl,
    pub input: TryOnInput,
}
