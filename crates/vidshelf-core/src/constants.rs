//! Constants shared by the storage backends, the catalog, and the HTTP layer.

/// Description stored when an upload arrives without one.
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// Description given to records the reconciler creates for untracked files.
pub const IMPORTED_DESCRIPTION: &str = "Video imported from uploads folder";

/// Title used when a discovered file has an empty stem.
pub const UNTITLED_VIDEO: &str = "Untitled Video";

/// Route under which locally stored files are served.
pub const UPLOADS_ROUTE: &str = "/api/uploads";

/// Extensions (lowercase, without dot) recognised as video files.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv", "flv", "wmv"];

/// Fallback used when a client sends no `Host` header.
pub const DEFAULT_HOST: &str = "localhost:3000";
