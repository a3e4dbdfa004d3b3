//! Serves stored video files by name.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use vidshelf_core::AppError;
use vidshelf_storage::{content_type_for, StorageError};

const CACHE_CONTROL: &str = "public, max-age=31536000";

#[utoipa::path(
    get,
    path = "/api/uploads/{filename}",
    tag = "uploads",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Video bytes with the content type of the file extension"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "serve_upload"))]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let data = state
        .catalog
        .blob_store()
        .read(&filename)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => AppError::NotFound("Video not found".to_string()),
            other => {
                tracing::error!(error = %other, file_name = %filename, "Failed to read stored video");
                other.into()
            }
        })?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&filename))
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
