//! Asset Staging - 并行暂存两张输入图片
//!
//! 两个上传同时进行，任何一方失败都不会取消另一方；
//! 调用方看到的要么是两个 URL，要么是一个错误

use std::path::Path;
use thiserror::Error;

use crate::application::ports::{StorageBackendPort, StorageError};
use crate::domain::tryon::StagedAsset;

/// 暂存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPair {
    pub person: StagedAsset,
    pub garment: StagedAsset,
}

impl StagedPair {
    pub fn public_urls(&self) -> [&str; 2] {
        [&self.person.public_url, &self.garment.public_url]
    }
}

/// 暂存失败
///
/// `orphans` 是失败时另一侧已经上传成功的资源，由编排层决定是否清理
#[derive(Debug, Error)]
#[error("{source}")]
pub struct StagingError {
    pub source: StorageError,
    pub orphans: Vec<StagedAsset>,
}

impl StagingError {
    pub fn into_parts(self) -> (StorageError, Vec<StagedAsset>) {
        (self.source, self.orphans)
    }
}

/// 把人物图和服装图暂存到指定后端
pub async fn stage_assets(
    backend: &dyn StorageBackendPort,
    person_path: &Path,
    garment_path: &Path,
) -> Result<StagedPair, StagingError> {
    let (person, garment) = tokio::join!(
        backend.upload_file(person_path, None),
        backend.upload_file(garment_path, None),
    );

    let staged = |path: &Path, public_url: String| StagedAsset {
        local_path: path.to_path_buf(),
        public_url,
    };

    match (person, garment) {
        (Ok(person_url), Ok(garment_url)) => Ok(StagedPair {
            person: staged(person_path, person_url),
            garment: staged(garment_path, garment_url),
        }),
        (Err(source), Ok(garment_url)) => Err(StagingError {
            source,
            orphans: vec![staged(garment_path, garment_url)],
        }),
        (Ok(person_url), Err(source)) => Err(StagingError {
            source,
            orphans: vec![staged(person_path, person_url)],
        }),
        (Err(source), Err(other)) => {
            tracing::debug!(error = %other, "Garment upload also failed");
            Err(StagingError {
                source,
                orphans: Vec::new(),
            })
        }
    }
}
