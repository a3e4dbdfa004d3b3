use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::request_base_url;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use vidshelf_core::models::{UploadRequest, VideoRecord};
use vidshelf_core::AppError;

const VIDEO_FIELD: &str = "video";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub video: VideoRecord,
}

/// Collect the `video`, `title`, and `description` fields of an upload form.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title = String::new();
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            VIDEO_FIELD => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple video fields are not allowed; send exactly one field named 'video'"
                            .to_string(),
                    ));
                }
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                file = Some((file_name, data));
            }
            "title" => {
                title = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read title: {}", e))
                })?;
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read description: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::InvalidInput("No video file provided.".to_string()))?;

    Ok(UploadRequest {
        title,
        description,
        file_name,
        data,
    })
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let request = read_upload_form(multipart).await?;
    let base_url = request_base_url(&headers);

    let video = state.catalog.upload(request, Some(&base_url)).await?;

    tracing::info!(
        video_id = %video.id,
        file_name = %video.file_name,
        "Video uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "Video uploaded successfully.".to_string(),
        video,
    })
    .into_response())
}
