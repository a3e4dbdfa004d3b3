use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::request_base_url;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use vidshelf_core::models::{NewVideo, VideoPatch, VideoRecord, VideoSummary};
use vidshelf_core::AppError;
use vidshelf_db::SyncContext;

const NOT_FOUND: &str = "Video not found.";

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListResponse {
    pub success: bool,
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoResponse {
    pub success: bool,
    pub video: VideoRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Register a file that is already in storage.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVideoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub stored_path: String,
}

fn video_response(video: VideoRecord) -> Json<VideoResponse> {
    Json(VideoResponse {
        success: true,
        video,
    })
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "All videos, including stored files adopted by this request", body = VideoListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers), fields(operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let sync = SyncContext::new(request_base_url(&headers));
    let videos = state.catalog.list_all(Some(&sync)).await?;

    Ok(Json(VideoListResponse {
        success: true,
        videos: videos.into_iter().map(VideoSummary::from).collect(),
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = RegisterVideoRequest,
    responses(
        (status = 201, description = "Video registered", body = VideoResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, request), fields(operation = "register_video"))]
pub async fn register_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RegisterVideoRequest>,
) -> Result<Response, HttpAppError> {
    let base_url = request_base_url(&headers);
    let video = state
        .catalog
        .register(
            NewVideo {
                title: request.title,
                description: request.description,
                file_name: request.file_name,
                stored_location: request.stored_path,
            },
            Some(&base_url),
        )
        .await?;

    Ok((StatusCode::CREATED, video_response(video)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let video = state
        .catalog
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    Ok(video_response(video).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    request_body = VideoPatch,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, patch), fields(operation = "update_video"))]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<VideoPatch>,
) -> Result<Response, HttpAppError> {
    let video = state
        .catalog
        .update(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    Ok(video_response(video).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video deleted", body = MessageResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_video"))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    if !state.catalog.delete(&id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()).into());
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Video deleted.".to_string(),
    })
    .into_response())
}
