//! Error types for the AQI forecast service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that can occur while loading artifacts or producing a forecast.
///
/// Every variant is fatal for the current render: the page reports the
/// problem and halts. Unparseable rows in the history table are not errors,
/// they are silently dropped during preprocessing.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required artifact file does not exist.
    #[error("artifact not found: {path}")]
    ArtifactMissing { path: String },

    /// An artifact file exists but cannot be decoded.
    #[error("malformed artifact {path}: {reason}")]
    ArtifactFormat { path: String, reason: String },

    /// Model and scaler carry different city tags than the one requested.
    #[error("artifact pairing mismatch: expected '{expected}', found '{found}'")]
    ArtifactMismatch { expected: String, found: String },

    /// No case-sensitive 'date' column after column-shape repair.
    #[error("'date' column not found, columns present: {columns:?}")]
    MissingDateColumn { columns: Vec<String> },

    /// No AQI column of any case after column-shape repair.
    #[error("AQI column not found, columns present: {columns:?}")]
    MissingAqiColumn { columns: Vec<String> },

    /// History table cannot be repaired into a usable shape.
    #[error("malformed history table: {0}")]
    MalformedTable(String),

    /// Fewer historical points than the model window requires.
    #[error("insufficient history: need at least {needed} points, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// City identifier outside the closed set.
    #[error("unknown city: '{0}'")]
    UnknownCity(String),

    /// Chart or page rendering failed.
    #[error("render error: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// HTTP status the error maps to when it reaches a handler boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ArtifactMissing { .. } => StatusCode::NOT_FOUND,
            AppError::UnknownCity(_) => StatusCode::NOT_FOUND,
            AppError::MissingDateColumn { .. }
            | AppError::MissingAqiColumn { .. }
            | AppError::MalformedTable(_)
            | AppError::InsufficientHistory { .. }
            | AppError::ArtifactMismatch { .. }
            | AppError::ArtifactFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!("render failed: {}", self);
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AppError::InsufficientHistory { needed: 14, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient history: need at least 14 points, got 5"
        );

        let err = AppError::MissingAqiColumn {
            columns: vec!["date".into(), "PM2.5".into()],
        };
        assert!(err.to_string().contains("PM2.5"));

        let err = AppError::ArtifactMismatch {
            expected: "delhi".into(),
            found: "blr".into(),
        };
        assert_eq!(
            err.to_string(),
            "artifact pairing mismatch: expected 'delhi', found 'blr'"
        );
    }

    #[test]
    fn status_codes_by_class() {
        let missing = AppError::ArtifactMissing { path: "x".into() };
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let short = AppError::InsufficientHistory { needed: 14, got: 0 };
        assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
