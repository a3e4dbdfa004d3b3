//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidshelf-api --test videos_test`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use vidshelf_api::setup::routes;
use vidshelf_api::state::AppState;
use vidshelf_core::{BaseConfig, Config, StorageBackend, VideoStoreConfig};

pub const MAX_VIDEO_SIZE_BYTES: usize = 64 * 1024;

/// Test application: server and the directory backing its storage.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self._temp_dir.path().join("uploads")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self._temp_dir.path().join("data").join("videos.json")
    }
}

pub fn test_config(root: &Path) -> Config {
    Config(Box::new(VideoStoreConfig {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
        },
        storage_backend: StorageBackend::Local,
        local_storage_path: root.join("uploads").display().to_string(),
        catalog_path: root.join("data").join("videos.json").display().to_string(),
        public_base_url: None,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        s3_prefix: "videos".to_string(),
        catalog_key: "catalog/videos.json".to_string(),
        max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
        video_allowed_extensions: ["mp4", "mov", "webm", "avi", "mkv", "flv", "wmv"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

/// Setup test app with local storage in a temporary directory.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());

    let catalog = vidshelf_db::create_catalog(&config)
        .await
        .expect("Failed to create catalog");
    let state = Arc::new(AppState::new(catalog));

    let app = routes::setup_routes(&config, state.clone())
        .await
        .expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Multipart upload form with a video file and the given text fields.
pub fn upload_form(
    file_name: &str,
    data: &'static [u8],
    title: Option<&str>,
    description: Option<&str>,
) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from_static(data))
        .file_name(file_name.to_string())
        .mime_type("video/mp4");
    let mut form = MultipartForm::new().add_part("video", part);
    if let Some(title) = title {
        form = form.add_text("title", title.to_string());
    }
    if let Some(description) = description {
        form = form.add_text("description", description.to_string());
    }
    form
}

/// Upload a video and return the `video` object of the response.
pub async fn upload_video(client: &TestServer, file_name: &str, title: &str) -> serde_json::Value {
    let response = client
        .post("/api/upload")
        .multipart(upload_form(file_name, b"0123456789", Some(title), None))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    body["video"].clone()
}

/// Path component of a video URL (`/api/uploads/...`).
pub fn uploads_path(url: &str) -> String {
    let start = url
        .find("/api/uploads/")
        .expect("Expected an uploads URL");
    url[start..].to_string()
}
