//! Vidshelf Core Library
//!
//! This crate provides the video record model, error types, configuration, and constants
//! shared by the storage, catalog, and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, VideoStoreConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
