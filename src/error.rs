//! Error types for token estimation

use crate::domain::ImageSize;

pub type Result<T, E = EstimateError> = std::result::Result<T, E>;

/// Everything the estimation core can fail with. Always returned to the caller, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("Invalid image size {height}x{width} (height x width): both dimensions must be positive")]
    InvalidImageSize { height: u32, width: u32 },

    #[error("Absolute aspect ratio must be smaller than {max}, got {ratio}")]
    AspectRatioTooExtreme { ratio: f64, max: f64 },

    #[error("No candidates to choose from: {what} is empty")]
    EmptyCandidateList { what: &'static str },

    #[error("Unsupported model family: {0}")]
    UnsupportedFamily(String),

    #[error("Config mismatch for {family}: expected {expected} geometry, got {actual}")]
    ConfigMismatch {
        family: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid geometry config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Resized size {resized} does not fit in target resolution {target}")]
    PaddingOverflow { resized: ImageSize, target: ImageSize },
}

impl EstimateError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        EstimateError::InvalidConfig { field, reason: reason.into() }
    }
}
