use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::DEFAULT_DESCRIPTION;

/// A catalog entry describing one stored video.
///
/// `stored_location` is a filesystem path for the local backend and a public URL for the
/// object-store backend. Catalog documents written before the field was renamed use
/// `storedPath`; documents that carry neither are back-filled from `url` on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub file_name: String,
    #[serde(alias = "storedPath", default)]
    pub stored_location: String,
    pub uploaded_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Apply a patch; only fields present in the patch change.
    pub fn apply(&mut self, patch: VideoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

/// Partial update of the mutable fields of a [`VideoRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct VideoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Public projection returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoSummary {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl From<VideoRecord> for VideoSummary {
    fn from(video: VideoRecord) -> Self {
        VideoSummary {
            title: video.title,
            description: video.description,
            url: video.url,
        }
    }
}

/// Metadata for a record whose bytes are already in the blob store.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub stored_location: String,
}

/// Everything needed to store a new video and catalog it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub data: Bytes,
}

impl UploadRequest {
    /// Trimmed description, or the placeholder when absent or blank.
    pub fn effective_description(&self) -> String {
        normalize_description(self.description.as_deref())
    }
}

/// Trim a client-supplied description and substitute the placeholder when it is blank.
pub fn normalize_description(description: Option<&str>) -> String {
    match description.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}
