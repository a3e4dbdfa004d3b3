//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vidshelf_core::models;

/// Returns the OpenAPI spec served at `/api-docs/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidshelf API",
        version = "0.1.0",
        description = "Upload, list, update, and delete videos. Video bytes live on local disk or in an object store; a JSON catalog holds their metadata."
    ),
    paths(
        handlers::upload::upload_video,
        handlers::videos::list_videos,
        handlers::videos::register_video,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::uploads::serve_upload,
    ),
    components(
        schemas(
            models::VideoRecord,
            models::VideoPatch,
            models::VideoSummary,
            handlers::upload::UploadResponse,
            handlers::videos::VideoListResponse,
            handlers::videos::VideoResponse,
            handlers::videos::MessageResponse,
            handlers::videos::RegisterVideoRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video catalog operations"),
        (name = "uploads", description = "Stored video files")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_video_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/upload"));
        assert!(spec.paths.paths.contains_key("/api/videos"));
        assert!(spec.paths.paths.contains_key("/api/videos/{id}"));
        assert!(spec.paths.paths.contains_key("/api/uploads/{filename}"));
    }
}
