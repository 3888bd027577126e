use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub mod pages;
pub mod video;

pub type ApiResult<T> = Result<T, ApiError>;

/// Boundary error taxonomy. Pipeline internals collapse to an opaque 500;
/// user-correctable upload mistakes map to 400; a consumed or unknown
/// download id maps to 404.
pub enum ApiError {
    MissingFilePart,
    NoSelectedFile,
    NotFound,
    Processing(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingFilePart => (StatusCode::BAD_REQUEST, "No file part"),
            ApiError::NoSelectedFile => (StatusCode::BAD_REQUEST, "No selected file"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Video not found"),
            ApiError::Processing(err) => {
                log::error!("video processing failed: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process video")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Processing(err.into())
    }
}
