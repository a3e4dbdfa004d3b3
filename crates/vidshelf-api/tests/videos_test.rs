//! Video API integration tests.
//!
//! Run with: `cargo test -p vidshelf-api --test videos_test`

mod helpers;

use helpers::{setup_test_app, upload_form, upload_video, uploads_path};

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");

    let response = app.client().get("/ready").await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_demo_upload_is_served_back() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/api/upload")
        .multipart(upload_form("demo.mp4", b"0123456789", Some("Demo"), None))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let video = &body["video"];
    assert_eq!(video["title"], "Demo");
    assert_eq!(video["description"], "No description provided.");
    assert!(video["fileName"].as_str().unwrap().ends_with(".mp4"));
    assert!(video["id"].as_str().is_some());
    assert!(video["uploadedAt"].as_str().is_some());

    let file = client
        .get(&uploads_path(video["url"].as_str().unwrap()))
        .await;
    assert_eq!(file.status_code(), 200);
    assert_eq!(&file.as_bytes()[..], b"0123456789");
    assert_eq!(file.header("content-type"), "video/mp4");
    assert_eq!(file.header("cache-control"), "public, max-age=31536000");
}

#[tokio::test]
async fn test_upload_requires_title_and_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/api/upload")
        .multipart(upload_form("demo.mp4", b"0123456789", Some("   "), None))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_INPUT");

    let response = client
        .post("/api/upload")
        .multipart(axum_test::multipart::MultipartForm::new().add_text("title", "No file"))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_rejects_non_video_extension() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form("notes.txt", b"hello", Some("Notes"), None))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_list_projects_and_adopts_stored_files() {
    let app = setup_test_app().await;
    let client = app.client();

    upload_video(client, "first.mp4", "First").await;
    std::fs::write(app.uploads_dir().join("holiday.mov"), b"holiday").unwrap();

    let response = client.get("/api/videos").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["title"], "First");
    assert_eq!(videos[1]["title"], "holiday");
    assert_eq!(videos[1]["description"], "Video imported from uploads folder");
    for video in videos {
        let keys: Vec<_> = video.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(video.get("url").is_some());
        assert!(video.get("id").is_none());
    }

    // A second listing adopts nothing new.
    let body: serde_json::Value = client.get("/api/videos").await.json();
    assert_eq!(body["videos"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_adopted_file_with_inner_dots_is_served_and_deletable() {
    let app = setup_test_app().await;
    let client = app.client();
    std::fs::write(app.uploads_dir().join("clip..final.mp4"), b"final cut").unwrap();

    let body: serde_json::Value = client.get("/api/videos").await.json();
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    let url = videos[0]["url"].as_str().unwrap().to_string();

    let file = client.get(&uploads_path(&url)).await;
    assert_eq!(file.status_code(), 200);
    assert_eq!(&file.as_bytes()[..], b"final cut");

    let records = app.state.catalog.list_all(None).await.unwrap();
    let response = client
        .delete(&format!("/api/videos/{}", records[0].id))
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(!app.uploads_dir().join("clip..final.mp4").exists());

    let body: serde_json::Value = client.get("/api/videos").await.json();
    assert!(body["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_update_delete_workflow() {
    let app = setup_test_app().await;
    let client = app.client();

    let video = upload_video(client, "clip.mp4", "Clip").await;
    let id = video["id"].as_str().unwrap();

    let response = client.get(&format!("/api/videos/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["video"], video);

    let response = client
        .patch(&format!("/api/videos/{}", id))
        .json(&serde_json::json!({ "description": "Updated" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["video"]["description"], "Updated");
    assert_eq!(body["video"]["title"], "Clip");
    assert_eq!(body["video"]["url"], video["url"]);

    let response = client.delete(&format!("/api/videos/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Video deleted.");

    let response = client.get(&format!("/api/videos/{}", id)).await;
    assert_eq!(response.status_code(), 404);

    let file = client.get(&uploads_path(video["url"].as_str().unwrap())).await;
    assert_eq!(file.status_code(), 404);
}

#[tokio::test]
async fn test_unknown_ids_return_not_found() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/api/videos/missing").await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Video not found.");
    assert_eq!(body["error"], "Video not found.");

    assert_eq!(client.delete("/api/videos/missing").await.status_code(), 404);
    let response = client
        .patch("/api/videos/missing")
        .json(&serde_json::json!({ "title": "x" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_register_existing_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/api/videos")
        .json(&serde_json::json!({ "title": "Only title" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let stored = app.uploads_dir().join("existing.mp4");
    std::fs::write(&stored, b"existing").unwrap();

    let response = client
        .post("/api/videos")
        .json(&serde_json::json!({
            "title": "Existing",
            "description": "Copied in by hand",
            "fileName": "existing.mp4",
            "storedPath": stored.display().to_string(),
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["video"]["fileName"], "existing.mp4");
    assert!(body["video"]["url"]
        .as_str()
        .unwrap()
        .ends_with("/api/uploads/existing.mp4"));

    let persisted = std::fs::read_to_string(app.catalog_path()).unwrap();
    assert!(persisted.contains("existing.mp4"));
}

#[tokio::test]
async fn test_serving_unknown_file_is_not_found() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/uploads/nothing-here.mp4").await;
    assert_eq!(response.status_code(), 404);
}
