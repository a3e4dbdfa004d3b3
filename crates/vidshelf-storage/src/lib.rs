//! Vidshelf Storage Library
//!
//! This crate provides the blob store abstraction for raw video bytes and its two
//! implementations: a local directory and an object store bucket (S3 or in-memory).
//!
//! # Naming
//!
//! Stored names are `{unix_millis}-{token}-{sanitized}`. Object store keys add a
//! namespace prefix: `{prefix}/{stored_name}`. Name generation and sanitization live in
//! the `keys` module so both backends agree.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod object;
pub mod traits;

// Re-export commonly used types
pub use keys::{content_type_for, has_allowed_extension, sanitize_file_name};
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
#[cfg(feature = "storage-s3")]
pub use object::ObjectBlobStore;
pub use traits::{BlobEntry, BlobStore, StorageError, StorageResult, StoredBlob};
pub use vidshelf_core::StorageBackend;
