use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::api::AppState;
use crate::handler::{ApiError, ApiResult};

pub fn video_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .route("/download/{id}", get(download))
}

#[derive(Serialize)]
struct UploadResponse {
    #[serde(rename = "downloadUrl")]
    download_url: String,
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::MissingFilePart)?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| ApiError::Processing(e.into()))?;
            file = Some((filename, data));
            break;
        }
    }
    let (filename, data) = file.ok_or(ApiError::MissingFilePart)?;
    if filename.is_empty() {
        return Err(ApiError::NoSelectedFile);
    }
    log::info!("upload: {} ({} bytes)", filename, data.len());

    // one synchronous pipeline per request, run to completion on a blocking
    // worker so the runtime stays responsive
    let kernel = state.config.blur_kernel;
    let processed =
        tokio::task::spawn_blocking(move || blur_pipe::transcode::blur_video(&data, kernel))
            .await
            .map_err(|e| ApiError::Processing(e.into()))?
            .map_err(|e| ApiError::Processing(e.into()))?;

    let download_name = format!("{}_blurred.mp4", sanitize_stem(&filename));
    let id = state.store.put(processed.into(), download_name)?;

    Ok(Json(UploadResponse {
        download_url: format!("/download/{}", id),
    }))
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let artifact = state.store.take(&id).ok_or(ApiError::NotFound)?;
    log::info!("download: {} ({} bytes)", artifact.filename, artifact.payload.len());
    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.filename),
            ),
        ],
        artifact.payload,
    )
        .into_response())
}

/// Filename stem reduced to a safe character set for the suggested download
/// name; header injection is impossible by construction.
fn sanitize_stem(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_stem;

    #[test]
    fn sanitize_keeps_simple_stems() {
        assert_eq!(sanitize_stem("dashcam.mp4"), "dashcam");
        assert_eq!(sanitize_stem("trip_2024-06.mov"), "trip_2024-06");
    }

    #[test]
    fn sanitize_strips_paths_and_specials() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem("a\"b;c.mp4"), "abc");
        assert_eq!(sanitize_stem("???.mp4"), "video");
    }
}
