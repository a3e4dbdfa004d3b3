use crate::keys::{
    default_video_extensions, generate_stored_name, has_allowed_extension, normalize_extensions,
    validate_file_name,
};
use crate::traits::{BlobEntry, BlobStore, StorageError, StorageResult, StoredBlob};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{DynObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::sync::Arc;

/// Object store blob store (S3, S3-compatible providers, or in-memory)
///
/// Videos are stored under `{prefix}/{stored_name}`. A record's `stored_location` is the
/// public URL of its object, which is also what `url_for` returns.
#[derive(Clone)]
pub struct ObjectBlobStore {
    store: Arc<DynObjectStore>,
    prefix: String,
    public_base_url: String,
    backend: StorageBackend,
    allowed_extensions: Vec<String>,
}

impl ObjectBlobStore {
    /// Wrap an existing object store.
    ///
    /// # Arguments
    /// * `store` - Object store holding the videos
    /// * `prefix` - Namespace for video objects (e.g., "videos")
    /// * `public_base_url` - URL prefix under which keys are publicly reachable
    pub fn new(
        store: Arc<DynObjectStore>,
        prefix: impl Into<String>,
        public_base_url: impl Into<String>,
        backend: StorageBackend,
    ) -> Self {
        ObjectBlobStore {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            backend,
            allowed_extensions: default_video_extensions(),
        }
    }

    /// Extensions `list` reports (defaults to the built-in video allowlist).
    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = normalize_extensions(extensions);
        self
    }

    /// Build an S3 object store from environment credentials and explicit settings.
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn build_s3(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
    ) -> StorageResult<Arc<DynObjectStore>> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Arc::new(store))
    }

    /// Public URL prefix of an S3 bucket.
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}
    pub fn s3_public_base_url(bucket: &str, region: &str, endpoint_url: Option<&str>) -> String {
        match endpoint_url {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        }
    }

    /// In-process store, for development and tests.
    pub fn in_memory(prefix: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self::new(
            Arc::new(InMemory::new()),
            prefix,
            public_base_url,
            StorageBackend::Memory,
        )
    }

    /// The underlying object store, shared with the catalog document.
    pub fn object_store(&self) -> Arc<DynObjectStore> {
        self.store.clone()
    }

    fn key_for(&self, file_name: &str) -> String {
        if self.prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.prefix, file_name)
        }
    }

    fn url_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Recover the object key from a stored location (public URL or bare key).
    ///
    /// The location must name exactly `{prefix}/{file_name}` in this store; URLs of other
    /// buckets or prefixes are rejected.
    fn location_to_key(&self, stored_location: &str) -> StorageResult<String> {
        let key = stored_location
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(stored_location);
        let file_name = key.rsplit('/').next().unwrap_or(key);

        if validate_file_name(file_name).is_err() || key != self.key_for(file_name) {
            return Err(StorageError::InvalidKey(format!(
                "Stored location is not an object of this store: {}",
                stored_location
            )));
        }
        Ok(key.to_string())
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn store(&self, suggested_name: &str, data: Bytes) -> StorageResult<StoredBlob> {
        let file_name = generate_stored_name(suggested_name);
        let key = self.key_for(&file_name);
        let size = data.len() as u64;
        let location = Path::from(key.clone());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.backend,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object store upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(StoredBlob {
            stored_location: self.url_for_key(&key),
            file_name,
        })
    }

    fn url_for(&self, blob: &StoredBlob, _base_url: Option<&str>) -> StorageResult<String> {
        if blob.stored_location.starts_with(&self.public_base_url) {
            return Ok(blob.stored_location.clone());
        }
        validate_file_name(&blob.file_name)?;
        Ok(self.url_for_key(&self.key_for(&blob.file_name)))
    }

    async fn delete(&self, stored_location: &str) -> StorageResult<()> {
        let key = self.location_to_key(stored_location)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.clone());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backend = %self.backend,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            backend = %self.backend,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store delete successful"
        );

        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<BlobEntry>> {
        let prefix = (!self.prefix.is_empty()).then(|| Path::from(self.prefix.clone()));
        let mut stream = self.store.list(prefix.as_ref());

        let mut entries = Vec::new();
        while let Some(item) = stream.next().await {
            let meta = match item {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backend = %self.backend,
                        prefix = %self.prefix,
                        "Failed to read object listing entry, skipping"
                    );
                    continue;
                }
            };

            let Some(file_name) = meta.location.filename().map(String::from) else {
                continue;
            };
            if !has_allowed_extension(&file_name, &self.allowed_extensions)
                || validate_file_name(&file_name).is_err()
            {
                continue;
            }
            // Nested keys are not produced by `store`; ignore them.
            if meta.location.as_ref() != self.key_for(&file_name) {
                continue;
            }

            entries.push(BlobEntry {
                stored_location: self.url_for_key(meta.location.as_ref()),
                file_name,
                created: None,
                modified: Some(meta.last_modified),
            });
        }

        tracing::debug!(
            backend = %self.backend,
            prefix = %self.prefix,
            count = entries.len(),
            "Listed stored video objects"
        );

        Ok(entries)
    }

    async fn read(&self, file_name: &str) -> StorageResult<Bytes> {
        validate_file_name(file_name)?;
        let key = self.key_for(file_name);
        let start = std::time::Instant::now();
        let location = Path::from(key.clone());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(file_name.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    backend = %self.backend,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            backend = %self.backend,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store download successful"
        );

        Ok(bytes)
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
