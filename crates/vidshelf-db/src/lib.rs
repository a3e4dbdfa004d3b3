//! Video catalog persistence
//!
//! The catalog is an ordered list of [`VideoRecord`](vidshelf_core::models::VideoRecord)s
//! persisted as one JSON document, either in a local file or as an object in an object
//! store. [`VideoCatalog`] owns every read-modify-write of that document and keeps it
//! consistent with the blob store that holds the video bytes.
//
// Catalog document backends, reconciliation, and the repository
pub mod catalog;
//
// Construction from configuration
pub mod factory;

pub use catalog::{CatalogDocument, JsonFileDocument, SyncContext, VideoCatalog};
#[cfg(feature = "storage-s3")]
pub use catalog::ObjectDocument;
pub use factory::create_catalog;
