use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SealError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        SealError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for SealError {
    fn from(err: image::ImageError) -> Self {
        SealError::Decode(err.to_string())
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for SealError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            SealError::Decode(_) => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            SealError::InvalidConfig { .. } => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            SealError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR"),
            SealError::ImageTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE"),
            SealError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            SealError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            SealError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
