//! Error types and handling
//!
//! Host-facing error type that the layer-specific errors convert into.

use crate::capture::CaptureError;
use crate::recorder::RecorderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl From<CaptureError> for AppError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            CaptureError::Io(e) => AppError::Io(e),
            other => AppError::Capture(other.to_string()),
        }
    }
}

impl From<RecorderError> for AppError {
    fn from(error: RecorderError) -> Self {
        match error {
            RecorderError::CaptureAcquisitionFailed(e) => e.into(),
            RecorderError::Save(e) => AppError::Io(e),
        }
    }
}

/// Error response for the host UI
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Capture(_) => "CAPTURE_FAILED",
            AppError::Recording(_) => "RECORDING_ERROR",
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_keeps_its_code() {
        let error: AppError = RecorderError::CaptureAcquisitionFailed(
            CaptureError::PermissionDenied("screen".to_string()),
        )
        .into();

        let response = ErrorResponse::from(error);
        assert_eq!(response.code, "PERMISSION_DENIED");
        assert_eq!(response.message, "Permission denied: screen");
    }

    #[test]
    fn test_save_failure_maps_to_io() {
        let error: AppError = RecorderError::Save(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        ))
        .into();

        assert_eq!(ErrorResponse::from(error).code, "IO_ERROR");
    }
}
