//! Try-On Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TryOnError {
    #[error("Invalid file type: {0}. Only JPEG, PNG, and WebP images are allowed.")]
    UnsupportedImageType(String),

    #[error("Prediction ID is required")]
    EmptyPredictionId,
}
