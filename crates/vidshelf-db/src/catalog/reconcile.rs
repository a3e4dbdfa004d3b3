//! Adoption of stored video files that have no catalog record.
//!
//! A blob is represented when some record's stored location, after normalization, equals
//! the blob's stored location. Unrepresented blobs become new records with the file stem
//! as title.

use std::collections::HashSet;
use vidshelf_core::constants::{IMPORTED_DESCRIPTION, UNTITLED_VIDEO};
use vidshelf_core::models::VideoRecord;
use vidshelf_storage::keys::{file_stem, random_token};
use vidshelf_storage::{BlobEntry, BlobStore};

const ID_TOKEN_LEN: usize = 7;

/// Canonical form of a stored location for comparison.
///
/// Backslashes become `/`, empty and `.` segments are dropped, and `..` removes the
/// preceding segment. Nothing touches the filesystem.
pub fn normalize_location(location: &str) -> String {
    let unified = location.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// New catalog id `{unix_millis}-{7 base36 chars}` not present in `taken`.
///
/// The id is added to `taken` before returning.
pub fn generate_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            random_token(ID_TOKEN_LEN)
        );
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Title for an adopted file: its stem, or a placeholder when the stem is blank.
pub fn title_for(file_name: &str) -> String {
    let stem = file_stem(file_name).trim();
    if stem.is_empty() {
        UNTITLED_VIDEO.to_string()
    } else {
        stem.to_string()
    }
}

/// Build records for every listed blob that no existing record points at.
///
/// Entries whose URL cannot be built are logged and skipped. The existing records are
/// not modified.
pub fn discover(
    existing: &[VideoRecord],
    entries: Vec<BlobEntry>,
    blobs: &dyn BlobStore,
    base_url: Option<&str>,
) -> Vec<VideoRecord> {
    let mut represented: HashSet<String> = existing
        .iter()
        .map(|v| normalize_location(&v.stored_location))
        .collect();
    let mut taken: HashSet<String> = existing.iter().map(|v| v.id.clone()).collect();

    let mut adopted = Vec::new();
    for entry in entries {
        let normalized = normalize_location(&entry.stored_location);
        if represented.contains(&normalized) {
            continue;
        }

        let url = match blobs.url_for(&entry.as_stored(), base_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file_name = %entry.file_name,
                    "Skipping unrecorded file, could not build its URL"
                );
                continue;
            }
        };

        represented.insert(normalized);
        adopted.push(VideoRecord {
            id: generate_id(&mut taken),
            title: title_for(&entry.file_name),
            description: IMPORTED_DESCRIPTION.to_string(),
            url,
            uploaded_at: entry.uploaded_at(),
            file_name: entry.file_name,
            stored_location: entry.stored_location,
        });
    }

    adopted
}
