//! Vidshelf API Library
//!
//! This crate provides the HTTP handlers, error rendering, and application setup around
//! the video catalog.

// Module declarations
mod api_doc;
mod handlers;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
