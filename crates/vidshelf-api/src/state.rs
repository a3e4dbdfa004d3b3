//! Shared application state.

use std::sync::Arc;
use vidshelf_db::VideoCatalog;

/// State handed to every handler.
pub struct AppState {
    pub catalog: Arc<VideoCatalog>,
}

impl AppState {
    pub fn new(catalog: VideoCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}
