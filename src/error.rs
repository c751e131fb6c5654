use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LatexError {
    #[error("Failed to initialize recognition engine: {0}")]
    InitializationError(String),

    #[error("No image file provided")]
    MissingFile,

    #[error("Invalid file type: {0}. Allowed: PNG, JPG, JPEG, GIF, BMP")]
    UnsupportedFormat(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Could not decode image: {0}")]
    DecodeError(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for any failed request
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for LatexError {
    fn into_response(self) -> Response {
        let status = match &self {
            LatexError::InitializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LatexError::MissingFile => StatusCode::BAD_REQUEST,
            LatexError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            LatexError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            LatexError::DecodeError(_) => StatusCode::BAD_REQUEST,
            LatexError::RecognitionFailed(_) => StatusCode::BAD_GATEWAY,
            LatexError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LatexError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
