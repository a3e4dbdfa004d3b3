#[cfg(feature = "storage-s3")]
use crate::catalog::ObjectDocument;
use crate::catalog::{CatalogDocument, JsonFileDocument, VideoCatalog};
use std::sync::Arc;
use vidshelf_core::{AppError, Config, StorageBackend};
#[cfg(feature = "storage-local")]
use vidshelf_storage::LocalBlobStore;
#[cfg(feature = "storage-s3")]
use vidshelf_storage::ObjectBlobStore;
use vidshelf_storage::{BlobStore, StorageError};

/// Create the video catalog and its blob store based on configuration
///
/// The local backend pairs a directory of videos with a JSON file. The object store
/// backends keep both the videos and the catalog document in the same store.
pub async fn create_catalog(config: &Config) -> Result<VideoCatalog, AppError> {
    let extensions = config.video_allowed_extensions().to_vec();
    let (document, blobs): (Arc<dyn CatalogDocument>, Arc<dyn BlobStore>) =
        match config.storage_backend() {
            #[cfg(feature = "storage-local")]
            StorageBackend::Local => {
                let blobs = LocalBlobStore::new(
                    config.local_storage_path(),
                    config.public_base_url().map(String::from),
                )
                .await?
                .with_allowed_extensions(extensions.clone());
                (
                    Arc::new(JsonFileDocument::new(config.catalog_path())),
                    Arc::new(blobs),
                )
            }

            #[cfg(not(feature = "storage-local"))]
            StorageBackend::Local => {
                return Err(StorageError::ConfigError(
                    "Local storage backend not available (storage-local feature not enabled)"
                        .to_string(),
                )
                .into())
            }

            #[cfg(feature = "storage-s3")]
            StorageBackend::S3 => {
                let bucket = config.s3_bucket().ok_or_else(|| {
                    StorageError::ConfigError("S3_BUCKET not configured".to_string())
                })?;
                let region = config
                    .s3_region()
                    .or_else(|| config.aws_region())
                    .ok_or_else(|| {
                        StorageError::ConfigError(
                            "S3_REGION or AWS_REGION not configured".to_string(),
                        )
                    })?;
                let endpoint = config.s3_endpoint();

                let store = ObjectBlobStore::build_s3(bucket, region, endpoint)?;
                let public_base_url = config
                    .public_base_url()
                    .map(String::from)
                    .unwrap_or_else(|| {
                        ObjectBlobStore::s3_public_base_url(bucket, region, endpoint)
                    });

                tracing::info!(
                    bucket = %bucket,
                    region = %region,
                    endpoint = ?endpoint,
                    prefix = %config.s3_prefix(),
                    "Using S3 video storage"
                );

                (
                    Arc::new(ObjectDocument::new(store.clone(), config.catalog_key())),
                    Arc::new(
                        ObjectBlobStore::new(
                            store,
                            config.s3_prefix(),
                            public_base_url,
                            StorageBackend::S3,
                        )
                        .with_allowed_extensions(extensions.clone()),
                    ),
                )
            }

            // In-memory objects are only reachable through the uploads route, so they are
            // keyed by bare file name and addressed like local files.
            #[cfg(feature = "storage-s3")]
            StorageBackend::Memory => {
                let base = config
                    .public_base_url()
                    .map(String::from)
                    .unwrap_or_else(|| format!("http://localhost:{}", config.server_port()));
                let blobs = ObjectBlobStore::in_memory(
                    "",
                    format!("{}{}", base, vidshelf_core::constants::UPLOADS_ROUTE),
                )
                .with_allowed_extensions(extensions.clone());
                (
                    Arc::new(ObjectDocument::new(
                        blobs.object_store(),
                        config.catalog_key(),
                    )),
                    Arc::new(blobs),
                )
            }

            #[cfg(not(feature = "storage-s3"))]
            StorageBackend::S3 | StorageBackend::Memory => {
                return Err(StorageError::ConfigError(
                    "Object storage backends not available (storage-s3 feature not enabled)"
                        .to_string(),
                )
                .into())
            }
        };

    tracing::info!(
        backend = %blobs.backend_type(),
        catalog = %document.location(),
        "Video catalog initialized"
    );

    Ok(VideoCatalog::new(document, blobs)
        .with_upload_limits(config.max_video_size_bytes(), extensions))
}
