//! Multipart Intake
//!
//! 把试衣请求的两张图片写入上传目录，并负责这些临时文件的清理

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::tryon::ImageMime;
use crate::infrastructure::http::error::ApiError;

pub const PERSON_IMAGE_FIELD: &str = "personImage";
pub const GARMENT_IMAGE_FIELD: &str = "garmentImage";
pub const TEXT_PROMPT_FIELD: &str = "textPrompt";

const FALLBACK_MIME: &str = "application/octet-stream";

/// 已写入磁盘的上传图片
#[derive(Debug)]
pub struct UploadedImage {
    pub path: PathBuf,
    /// 客户端声明的 Content-Type，未校验
    pub mime: String,
    pub original_name: Option<String>,
}

/// 解析后的试衣表单
///
/// 持有本次请求写入的全部临时文件，`cleanup` 消耗自身，因此只会执行一次
#[derive(Debug, Default)]
pub struct TryOnForm {
    pub person: Option<UploadedImage>,
    pub garment: Option<UploadedImage>,
    pub text_prompt: Option<String>,
}

impl TryOnForm {
    pub fn written_files(&self) -> Vec<&Path> {
        [&self.person, &self.garment]
            .into_iter()
            .flatten()
            .map(|image| image.path.as_path())
            .collect()
    }

    /// 删除本次请求写入的临时文件，失败只记录日志
    pub async fn cleanup(self) {
        for path in self.written_files() {
            remove_upload(path).await;
        }
    }
}

/// 删除一个上传文件；文件已不存在视为成功，其他失败记 warn 并返回 false
async fn remove_upload(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Cleaned up local file");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to clean up local file");
            false
        }
    }
}

/// 读取 multipart 表单
///
/// 出错时已写入的文件会在返回前删除
pub async fn read_tryon_form(
    multipart: &mut Multipart,
    upload_dir: &Path,
    max_file_size: u64,
) -> Result<TryOnForm, ApiError> {
    let mut form = TryOnForm::default();

    match read_fields(multipart, &mut form, upload_dir, max_file_size).await {
        Ok(()) => Ok(form),
        Err(e) => {
            form.cleanup().await;
            Err(e)
        }
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    form: &mut TryOnForm,
    upload_dir: &Path,
    max_file_size: u64,
) -> Result<(), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        match field_name.as_str() {
            PERSON_IMAGE_FIELD | GARMENT_IMAGE_FIELD => {
                let slot = if field_name == PERSON_IMAGE_FIELD {
                    &mut form.person
                } else {
                    &mut form.garment
                };
                if slot.is_some() {
                    return Err(ApiError::InvalidUpload {
                        error: "Too many files".to_string(),
                        details: format!("Only one {} is accepted", field_name),
                    });
                }
                *slot = Some(save_image(field, upload_dir, max_file_size).await?);
            }
            TEXT_PROMPT_FIELD if !is_file => {
                form.text_prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, max_file_size))?,
                );
            }
            _ if is_file => {
                return Err(ApiError::InvalidUpload {
                    error: "Unexpected file field".to_string(),
                    details: format!("Invalid file field name: {}", field_name),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

async fn save_image(
    mut field: Field<'_>,
    upload_dir: &Path,
    max_file_size: u64,
) -> Result<UploadedImage, ApiError> {
    let original_name = field.file_name().map(|s| s.to_string());
    let mime = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
    let ext = file_extension(original_name.as_deref(), &mime);

    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| internal_io("Failed to create upload directory", e))?;

    let path = upload_dir.join(format!("{}.{}", Uuid::new_v4(), ext));
    let mut file = fs::File::create(&path)
        .await
        .map_err(|e| internal_io("Failed to save uploaded file", e))?;

    let mut written: u64 = 0;
    let copied: Result<(), ApiError> = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?
        {
            written += chunk.len() as u64;
            if written > max_file_size {
                return Err(file_too_large(max_file_size));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| internal_io("Failed to save uploaded file", e))?;
        }
        file.flush()
            .await
            .map_err(|e| internal_io("Failed to save uploaded file", e))
    }
    .await;

    if let Err(e) = copied {
        drop(file);
        remove_upload(&path).await;
        return Err(e);
    }

    tracing::debug!(path = %path.display(), mime = %mime, bytes = written, "Upload stored");

    Ok(UploadedImage {
        path,
        mime,
        original_name,
    })
}

/// 扩展名取客户端文件名，其次由 MIME 推断
pub fn file_extension(file_name: Option<&str>, mime: &str) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| {
            ImageMime::parse(mime)
                .ok()
                .map(|m| m.extension().to_string())
        })
        .unwrap_or_else(|| "bin".to_string())
}

fn file_too_large(max_file_size: u64) -> ApiError {
    ApiError::InvalidUpload {
        error: "File too large".to_string(),
        details: format!("Maximum file size is {}MB", max_file_size / 1024 / 1024),
    }
}

fn multipart_error(e: MultipartError, max_file_size: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(max_file_size);
    }
    ApiError::BadRequest(format!("Failed to read multipart field: {}", e.body_text()))
}

fn internal_io(context: &str, e: std::io::Error) -> ApiError {
    ApiError::Internal {
        error: context.to_string(),
        details: Some(e.to_string()),
    }
}
