use crate::keys::{
    default_video_extensions, generate_stored_name, has_allowed_extension, normalize_extensions,
    validate_file_name,
};
use crate::traits::{BlobEntry, BlobStore, StorageError, StorageResult, StoredBlob};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use vidshelf_core::constants::UPLOADS_ROUTE;

/// Local filesystem blob store
///
/// Files live directly in `base_path`; a record's `stored_location` is the absolute path
/// of its file.
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    public_base_url: Option<String>,
    allowed_extensions: Vec<String>,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding uploaded videos (e.g., "./uploads")
    /// * `public_base_url` - Base URL used when a caller supplies none (e.g., "http://localhost:4000")
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let base_path = fs::canonicalize(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore {
            base_path,
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
            allowed_extensions: default_video_extensions(),
        })
    }

    /// Extensions `list` reports (defaults to the built-in video allowlist).
    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = normalize_extensions(extensions);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a file name inside the storage directory.
    fn file_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.base_path.join(file_name))
    }

    /// Map a stored location to a file directly inside the storage directory.
    ///
    /// A location whose parent directory is not `base_path` is rejected, even when a file
    /// of the same name exists here.
    async fn location_to_path(&self, stored_location: &str) -> StorageResult<PathBuf> {
        let outside = || {
            StorageError::InvalidKey(format!(
                "Stored location is not inside {}: {}",
                self.base_path.display(),
                stored_location
            ))
        };

        let location = Path::new(stored_location);
        let file_name = location
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(outside)?;
        validate_file_name(file_name).map_err(|_| outside())?;

        let parent = match location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let parent = match fs::canonicalize(parent).await {
            Ok(resolved) => resolved,
            // A vanished directory can still be ours when the location is absolute.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => parent.to_path_buf(),
            Err(_) => return Err(outside()),
        };
        if parent != self.base_path {
            return Err(outside());
        }

        Ok(self.base_path.join(file_name))
    }

    fn entry_for(&self, file_name: String, metadata: Option<std::fs::Metadata>) -> BlobEntry {
        let stored_location = self.base_path.join(&file_name).display().to_string();
        let (created, modified) = match metadata {
            Some(meta) => (
                meta.created().ok().map(DateTime::<Utc>::from),
                meta.modified().ok().map(DateTime::<Utc>::from),
            ),
            None => (None, None),
        };
        BlobEntry {
            file_name,
            stored_location,
            created,
            modified,
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, suggested_name: &str, data: Bytes) -> StorageResult<StoredBlob> {
        let file_name = generate_stored_name(suggested_name);
        let path = self.file_path(&file_name)?;
        let size = data.len();

        fs::create_dir_all(&self.base_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            file_name = %file_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredBlob {
            file_name,
            stored_location: path.display().to_string(),
        })
    }

    fn url_for(&self, blob: &StoredBlob, base_url: Option<&str>) -> StorageResult<String> {
        let base = base_url
            .map(|u| u.trim_end_matches('/'))
            .or(self.public_base_url.as_deref())
            .ok_or_else(|| StorageError::MissingBaseUrl(blob.file_name.clone()))?;
        Ok(format!(
            "{}{}/{}",
            base,
            UPLOADS_ROUTE,
            urlencoding::encode(&blob.file_name)
        ))
    }

    async fn delete(&self, stored_location: &str) -> StorageResult<()> {
        let path = self.location_to_path(stored_location).await?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<BlobEntry>> {
        if !fs::try_exists(&self.base_path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut dir = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut entries = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %self.base_path.display(),
                        "Failed to read directory entry, stopping listing"
                    );
                    break;
                }
            };

            let Some(file_name) = entry.file_name().to_str().map(String::from) else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            if !has_allowed_extension(&file_name, &self.allowed_extensions)
                || validate_file_name(&file_name).is_err()
            {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(meta) if meta.is_file() => Some(meta),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        file_name = %file_name,
                        "Failed to stat stored file, timestamps unavailable"
                    );
                    None
                }
            };

            entries.push(self.entry_for(file_name, metadata));
        }

        tracing::debug!(
            path = %self.base_path.display(),
            count = entries.len(),
            "Listed local video files"
        );

        Ok(entries)
    }

    async fn read(&self, file_name: &str) -> StorageResult<Bytes> {
        let path = self.file_path(file_name)?;
        let start = std::time::Instant::now();

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(file_name.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(Bytes::from(data))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store_in(dir: &Path) -> LocalBlobStore {
        LocalBlobStore::new(dir, Some("http://localhost:3000".to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_then_read() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        let data = Bytes::from_static(b"0123456789");
        let blob = storage.store("clip.mp4", data.clone()).await.unwrap();

        assert!(blob.file_name.ends_with("-clip.mp4"));
        assert!(Path::new(&blob.stored_location).is_absolute());
        assert_eq!(storage.read(&blob.file_name).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_store_sanitizes_suggested_name() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        let blob = storage
            .store("a b/../c*.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(!blob.file_name.contains('/'));
        assert!(!blob.file_name.contains(".."));
        assert!(blob.file_name.ends_with(".mp4"));
        assert_eq!(
            Path::new(&blob.stored_location).parent().unwrap(),
            storage.base_path()
        );
    }

    #[tokio::test]
    async fn test_store_recreates_missing_directory() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("uploads");
        let storage = store_in(&base).await;
        std::fs::remove_dir_all(&base).unwrap();

        let blob = storage
            .store("clip.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(Path::new(&blob.stored_location).exists());
    }

    #[tokio::test]
    async fn test_url_for_prefers_request_base_url() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;
        let blob = StoredBlob {
            file_name: "1-abc-clip.mp4".to_string(),
            stored_location: "/x/1-abc-clip.mp4".to_string(),
        };

        assert_eq!(
            storage.url_for(&blob, Some("https://videos.example.com/")).unwrap(),
            "https://videos.example.com/api/uploads/1-abc-clip.mp4"
        );
        assert_eq!(
            storage.url_for(&blob, None).unwrap(),
            "http://localhost:3000/api/uploads/1-abc-clip.mp4"
        );
    }

    #[tokio::test]
    async fn test_url_for_without_any_base_url_fails() {
        let dir = tempdir().unwrap();
        let storage = LocalBlobStore::new(dir.path(), None).await.unwrap();
        let blob = StoredBlob {
            file_name: "a.mp4".to_string(),
            stored_location: "/x/a.mp4".to_string(),
        };
        assert!(matches!(
            storage.url_for(&blob, None),
            Err(StorageError::MissingBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_url_for_encodes_file_name() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;
        let blob = StoredBlob {
            file_name: "my holiday.mp4".to_string(),
            stored_location: "/x/my holiday.mp4".to_string(),
        };
        assert_eq!(
            storage.url_for(&blob, None).unwrap(),
            "http://localhost:3000/api/uploads/my%20holiday.mp4"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;
        let blob = storage
            .store("clip.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap();

        storage.delete(&blob.stored_location).await.unwrap();
        assert!(!Path::new(&blob.stored_location).exists());

        assert!(storage.delete(&blob.stored_location).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rejects_location_outside_storage_directory() {
        let dir = tempdir().unwrap();
        let storage = store_in(&dir.path().join("uploads")).await;
        let blob = storage
            .store("clip.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap();

        let elsewhere = dir.path().join("archive");
        std::fs::create_dir(&elsewhere).unwrap();
        let foreign = elsewhere.join(&blob.file_name).display().to_string();
        assert!(matches!(
            storage.delete(&foreign).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage
                .delete(&format!("/mnt/archive/{}", blob.file_name))
                .await,
            Err(StorageError::InvalidKey(_))
        ));
        let windows_location = format!("C:\\old\\uploads\\{}", blob.file_name);
        assert!(storage.delete(&windows_location).await.is_err());

        assert!(Path::new(&blob.stored_location).exists());
    }

    #[tokio::test]
    async fn test_delete_accepts_unnormalized_location_inside_storage_directory() {
        let dir = tempdir().unwrap();
        let storage = store_in(&dir.path().join("uploads")).await;
        let blob = storage
            .store("clip.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap();

        let location = storage
            .base_path()
            .join("..")
            .join("uploads")
            .join(&blob.file_name)
            .display()
            .to_string();
        storage.delete(&location).await.unwrap();
        assert!(!Path::new(&blob.stored_location).exists());
    }

    #[tokio::test]
    async fn test_inner_dots_are_listed_served_and_deleted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("clip..final.mp4"), b"abc").unwrap();
        let storage = store_in(dir.path()).await;

        let entries = storage.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "clip..final.mp4");

        assert_eq!(
            storage.read("clip..final.mp4").await.unwrap(),
            Bytes::from_static(b"abc")
        );
        storage.delete(&entries[0].stored_location).await.unwrap();
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_honors_configured_extensions() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        std::fs::write(dir.path().join("b.m4v"), b"b").unwrap();
        let storage = store_in(dir.path())
            .await
            .with_allowed_extensions(vec!["m4v".to_string()]);

        let names: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.file_name)
            .collect();
        assert_eq!(names, vec!["b.m4v".to_string()]);
    }

    #[tokio::test]
    async fn test_list_only_returns_video_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        std::fs::write(dir.path().join("b.MKV"), b"b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"c").unwrap();
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();
        let storage = store_in(dir.path()).await;

        let mut names: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.file_name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.mp4".to_string(), "b.MKV".to_string()]);
    }

    #[tokio::test]
    async fn test_list_reports_modification_time() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        let storage = store_in(dir.path()).await;

        let entries = storage.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].modified.is_some());
    }

    #[tokio::test]
    async fn test_read_rejects_traversal_and_missing() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        assert!(matches!(
            storage.read("../../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.read("missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
