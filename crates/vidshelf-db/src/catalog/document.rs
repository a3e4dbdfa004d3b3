//! Whole-document persistence of the video catalog.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use vidshelf_core::models::VideoRecord;
use vidshelf_core::AppError;
use vidshelf_storage::keys::random_token;

/// Load and save the complete catalog as a single document.
///
/// A missing document is an empty catalog. Any other read or parse failure is an error,
/// so callers can tell "empty" apart from "unreadable".
#[async_trait]
pub trait CatalogDocument: Send + Sync {
    async fn load(&self) -> Result<Vec<VideoRecord>, AppError>;

    /// Replace the stored document with `videos`, in order.
    async fn save(&self, videos: &[VideoRecord]) -> Result<(), AppError>;

    /// Where the document lives, for logs.
    fn location(&self) -> String;
}

fn parse_document(raw: &[u8], location: &str) -> Result<Vec<VideoRecord>, AppError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut videos: Vec<VideoRecord> = serde_json::from_slice(raw).map_err(|e| {
        AppError::Persistence(format!("Failed to parse catalog {}: {}", location, e))
    })?;

    // Documents written without a stored location address blobs by URL.
    for video in videos.iter_mut() {
        if video.stored_location.is_empty() {
            video.stored_location = video.url.clone();
        }
    }

    Ok(videos)
}

fn render_document(videos: &[VideoRecord], location: &str) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(videos).map_err(|e| {
        AppError::Persistence(format!("Failed to serialize catalog {}: {}", location, e))
    })
}

/// Catalog stored as a pretty-printed JSON array in a local file.
///
/// Saves write a sibling temporary file and rename it over the document, so a reader
/// sees either the old or the new catalog.
#[derive(Debug, Clone)]
pub struct JsonFileDocument {
    path: PathBuf,
}

impl JsonFileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "videos.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, random_token(8)))
    }
}

#[async_trait]
impl CatalogDocument for JsonFileDocument {
    async fn load(&self) -> Result<Vec<VideoRecord>, AppError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Catalog file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Persistence(format!(
                    "Failed to read catalog {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        parse_document(&raw, &self.location())
    }

    async fn save(&self, videos: &[VideoRecord]) -> Result<(), AppError> {
        let body = render_document(videos, &self.location())?;
        let start = std::time::Instant::now();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Persistence(format!(
                    "Failed to create catalog directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = self.temp_path();
        let write = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            fs::rename(&temp, &self.path).await?;
            Ok::<(), std::io::Error>(())
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp).await;
            return Err(AppError::Persistence(format!(
                "Failed to write catalog {}: {}",
                self.path.display(),
                e
            )));
        }

        tracing::debug!(
            path = %self.path.display(),
            count = videos.len(),
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Catalog saved"
        );

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(feature = "storage-s3")]
pub use object::ObjectDocument;

#[cfg(feature = "storage-s3")]
mod object {
    use super::*;
    use object_store::path::Path as ObjectPath;
    use object_store::Error as ObjectStoreError;
    use object_store::{DynObjectStore, ObjectStoreExt, PutPayload};
    use std::sync::Arc;

    /// Catalog stored as one JSON object under a fixed key.
    ///
    /// Object puts replace the whole value, so readers never observe a partial document.
    #[derive(Clone)]
    pub struct ObjectDocument {
        store: Arc<DynObjectStore>,
        key: ObjectPath,
    }

    impl ObjectDocument {
        pub fn new(store: Arc<DynObjectStore>, key: &str) -> Self {
            Self {
                store,
                key: ObjectPath::from(key.trim_matches('/')),
            }
        }
    }

    #[async_trait]
    impl CatalogDocument for ObjectDocument {
        async fn load(&self) -> Result<Vec<VideoRecord>, AppError> {
            let result = match self.store.get(&self.key).await {
                Ok(result) => result,
                Err(ObjectStoreError::NotFound { .. }) => {
                    tracing::debug!(key = %self.key, "Catalog object missing, starting empty");
                    return Ok(Vec::new());
                }
                Err(e) => {
                    return Err(AppError::Persistence(format!(
                        "Failed to read catalog {}: {}",
                        self.key, e
                    )))
                }
            };

            let raw = result.bytes().await.map_err(|e| {
                AppError::Persistence(format!("Failed to read catalog {}: {}", self.key, e))
            })?;

            parse_document(&raw, &self.location())
        }

        async fn save(&self, videos: &[VideoRecord]) -> Result<(), AppError> {
            let body = render_document(videos, &self.location())?;
            let size = body.len();
            let start = std::time::Instant::now();

            self.store
                .put(&self.key, PutPayload::from(body))
                .await
                .map_err(|e| {
                    AppError::Persistence(format!("Failed to write catalog {}: {}", self.key, e))
                })?;

            tracing::debug!(
                key = %self.key,
                count = videos.len(),
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Catalog saved"
            );

            Ok(())
        }

        fn location(&self) -> String {
            self.key.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {}", id),
            description: "d".to_string(),
            url: format!("http://localhost:3000/api/uploads/{}.mp4", id),
            file_name: format!("{}.mp4", id),
            stored_location: format!("/srv/uploads/{}.mp4", id),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = JsonFileDocument::new(dir.path().join("data").join("videos.json"));
        assert!(doc.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let doc = JsonFileDocument::new(dir.path().join("data").join("videos.json"));
        let videos = vec![record("b"), record("a"), record("c")];

        doc.save(&videos).await.unwrap();

        let loaded = doc.load().await.unwrap();
        assert_eq!(loaded, videos);

        let raw = std::fs::read_to_string(doc.path()).unwrap();
        assert!(raw.starts_with("[\n"));
        assert!(raw.contains("\"fileName\""));

        // No temporary files are left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("data"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(&path, "{not json").unwrap();

        let doc = JsonFileDocument::new(&path);
        assert!(matches!(
            doc.load().await,
            Err(AppError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_stored_location_falls_back_to_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "1-abc",
                "title": "t",
                "description": "d",
                "url": "https://bucket.s3.us-east-1.amazonaws.com/videos/a.mp4",
                "fileName": "a.mp4",
                "uploadedAt": "2024-05-01T10:00:00Z"
            }]"#,
        )
        .unwrap();

        let loaded = JsonFileDocument::new(&path).load().await.unwrap();
        assert_eq!(loaded[0].stored_location, loaded[0].url);
    }

    #[cfg(feature = "storage-s3")]
    #[tokio::test]
    async fn test_object_document_roundtrip() {
        let store: std::sync::Arc<object_store::DynObjectStore> =
            std::sync::Arc::new(object_store::memory::InMemory::new());
        let doc = ObjectDocument::new(store, "catalog/videos.json");

        assert!(doc.load().await.unwrap().is_empty());

        let videos = vec![record("x"), record("y")];
        doc.save(&videos).await.unwrap();
        assert_eq!(doc.load().await.unwrap(), videos);
    }
}
