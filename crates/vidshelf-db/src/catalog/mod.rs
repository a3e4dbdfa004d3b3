mod document;
pub mod reconcile;
mod repository;

#[cfg(feature = "storage-s3")]
pub use document::ObjectDocument;
pub use document::{CatalogDocument, JsonFileDocument};
pub use repository::{SyncContext, VideoCatalog};
