use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use vidshelf_core::models::{NewVideo, UploadRequest, VideoPatch, VideoRecord};
use vidshelf_core::AppError;
use vidshelf_storage::keys::{default_video_extensions, has_allowed_extension, normalize_extensions};
use vidshelf_storage::{BlobStore, StoredBlob};

use super::document::CatalogDocument;
use super::reconcile;

/// Request context for a reconciling list: the base URL used to address adopted files.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    pub base_url: Option<String>,
}

impl SyncContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }
}

/// Video catalog repository
///
/// Owns the catalog document and coordinates with the blob store holding the bytes.
/// Every mutation (create, update, delete, and reconciling list) runs its whole
/// load-modify-save cycle under one writer lock, so concurrent requests in this process
/// cannot lose each other's updates. Plain reads do not take the lock.
pub struct VideoCatalog {
    document: Arc<dyn CatalogDocument>,
    blobs: Arc<dyn BlobStore>,
    write_lock: Mutex<()>,
    max_video_size_bytes: usize,
    allowed_extensions: Vec<String>,
}

impl VideoCatalog {
    pub fn new(document: Arc<dyn CatalogDocument>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            document,
            blobs,
            write_lock: Mutex::new(()),
            max_video_size_bytes: usize::MAX,
            allowed_extensions: default_video_extensions(),
        }
    }

    /// Limits enforced by [`upload`](Self::upload).
    pub fn with_upload_limits(
        mut self,
        max_video_size_bytes: usize,
        allowed_extensions: Vec<String>,
    ) -> Self {
        self.max_video_size_bytes = max_video_size_bytes;
        self.allowed_extensions = normalize_extensions(allowed_extensions);
        self
    }

    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        self.blobs.clone()
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.max_video_size_bytes
    }

    /// All records in insertion order.
    ///
    /// With a sync context, stored files without a record are adopted first and the
    /// extended catalog is saved once. When that save fails the catalog as it was before
    /// adoption is returned, so ids handed out always exist in the persisted document.
    #[tracing::instrument(skip(self, sync), fields(catalog.operation = "list", sync = sync.is_some()))]
    pub async fn list_all(&self, sync: Option<&SyncContext>) -> Result<Vec<VideoRecord>, AppError> {
        let Some(sync) = sync else {
            return self.document.load().await;
        };

        let _guard = self.write_lock.lock().await;
        let videos = self.document.load().await?;

        let entries = match self.blobs.list().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = %self.blobs.backend_type(),
                    "Failed to list stored videos, skipping reconciliation"
                );
                return Ok(videos);
            }
        };

        let adopted =
            reconcile::discover(&videos, entries, self.blobs.as_ref(), sync.base_url.as_deref());
        if adopted.is_empty() {
            return Ok(videos);
        }

        let adopted_count = adopted.len();
        let mut merged = videos.clone();
        merged.extend(adopted);

        if let Err(e) = self.document.save(&merged).await {
            tracing::error!(
                error = %e,
                catalog = %self.document.location(),
                adopted = adopted_count,
                "Failed to save reconciled catalog, returning catalog without adopted files"
            );
            return Ok(videos);
        }

        tracing::info!(
            catalog = %self.document.location(),
            adopted = adopted_count,
            total = merged.len(),
            "Adopted stored videos without catalog records"
        );

        Ok(merged)
    }

    #[tracing::instrument(skip(self), fields(catalog.operation = "get", catalog.record_id = %id))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<VideoRecord>, AppError> {
        let videos = self.document.load().await?;
        Ok(videos.into_iter().find(|v| v.id == id))
    }

    /// Catalog a file already present in the blob store.
    ///
    /// Assigns a fresh id and builds the public URL through the blob store. A save
    /// failure is returned and leaves the catalog unchanged.
    #[tracing::instrument(skip(self, new), fields(catalog.operation = "create", file_name = %new.file_name))]
    pub async fn create(
        &self,
        new: NewVideo,
        base_url: Option<&str>,
    ) -> Result<VideoRecord, AppError> {
        let blob = StoredBlob {
            file_name: new.file_name,
            stored_location: new.stored_location,
        };
        let url = self.blobs.url_for(&blob, base_url)?;

        let _guard = self.write_lock.lock().await;
        let mut videos = self.document.load().await?;

        let mut taken: HashSet<String> = videos.iter().map(|v| v.id.clone()).collect();
        let video = VideoRecord {
            id: reconcile::generate_id(&mut taken),
            title: new.title,
            description: new.description,
            url,
            file_name: blob.file_name,
            stored_location: blob.stored_location,
            uploaded_at: chrono::Utc::now(),
        };

        videos.push(video.clone());
        self.document.save(&videos).await?;

        tracing::info!(
            video_id = %video.id,
            file_name = %video.file_name,
            "Video record created"
        );

        Ok(video)
    }

    /// Validate an upload, store its bytes, then catalog it.
    ///
    /// If the record cannot be saved after the bytes were stored, the file stays in the
    /// blob store and is adopted by the next reconciling list.
    #[tracing::instrument(skip(self, request), fields(catalog.operation = "upload", file_name = %request.file_name, size_bytes = request.data.len()))]
    pub async fn upload(
        &self,
        request: UploadRequest,
        base_url: Option<&str>,
    ) -> Result<VideoRecord, AppError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }
        if request.data.is_empty() {
            return Err(AppError::InvalidInput("No video file provided".to_string()));
        }
        if request.data.len() > self.max_video_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File size {} exceeds maximum allowed size of {} bytes",
                request.data.len(),
                self.max_video_size_bytes
            )));
        }
        if !has_allowed_extension(&request.file_name, &self.allowed_extensions) {
            return Err(AppError::InvalidInput(format!(
                "Invalid file type. Allowed extensions: {}",
                self.allowed_extensions.join(", ")
            )));
        }

        let description = request.effective_description();
        let stored = self.blobs.store(&request.file_name, request.data).await?;

        let new = NewVideo {
            title,
            description,
            file_name: stored.file_name.clone(),
            stored_location: stored.stored_location,
        };

        self.create(new, base_url).await.inspect_err(|e| {
            tracing::warn!(
                error = %e,
                file_name = %stored.file_name,
                "Video stored but not cataloged; it will be adopted on the next sync"
            );
        })
    }

    /// Catalog a file that was stored out of band. All fields must be non-blank.
    #[tracing::instrument(skip(self, new), fields(catalog.operation = "register", file_name = %new.file_name))]
    pub async fn register(
        &self,
        new: NewVideo,
        base_url: Option<&str>,
    ) -> Result<VideoRecord, AppError> {
        if [&new.title, &new.description, &new.file_name, &new.stored_location]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AppError::InvalidInput(
                "Missing required fields: title, description, fileName, storedPath".to_string(),
            ));
        }

        self.create(new, base_url).await
    }

    /// Merge `patch` into the record with `id`. Returns `None` for an unknown id.
    #[tracing::instrument(skip(self, patch), fields(catalog.operation = "update", catalog.record_id = %id))]
    pub async fn update(
        &self,
        id: &str,
        patch: VideoPatch,
    ) -> Result<Option<VideoRecord>, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut videos = self.document.load().await?;

        let Some(video) = videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(video.clone()));
        }

        video.apply(patch);
        let updated = video.clone();
        self.document.save(&videos).await?;

        tracing::info!(video_id = %id, "Video record updated");

        Ok(Some(updated))
    }

    /// Remove the record with `id`, then its bytes.
    ///
    /// The record is removed and saved first. Deleting the bytes afterwards is best
    /// effort: a failure is reported as an `orphaned_blob` audit event and does not fail
    /// the call. Returns `false` for an unknown id.
    #[tracing::instrument(skip(self), fields(catalog.operation = "delete", catalog.record_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let removed = {
            let _guard = self.write_lock.lock().await;
            let mut videos = self.document.load().await?;

            let Some(index) = videos.iter().position(|v| v.id == id) else {
                return Ok(false);
            };

            let removed = videos.remove(index);
            self.document.save(&videos).await?;
            removed
        };

        tracing::info!(
            target: "audit",
            event = "video_deleted",
            video_id = %removed.id,
            file_name = %removed.file_name,
            "Video record deleted"
        );

        if let Err(e) = self.blobs.delete(&removed.stored_location).await {
            tracing::warn!(
                target: "audit",
                event = "orphaned_blob",
                error = %e,
                video_id = %removed.id,
                stored_location = %removed.stored_location,
                backend = %self.blobs.backend_type(),
                "Video record deleted but its file could not be removed"
            );
        }

        Ok(true)
    }
}
