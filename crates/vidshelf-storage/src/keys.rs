//! Shared naming rules for storage backends.
//!
//! Stored names have the form `{unix_millis}-{token}-{sanitized}` where `sanitized` only
//! contains `[A-Za-z0-9._-]`, never starts with a dot and never contains `..`.

use crate::traits::{StorageError, StorageResult};
use rand::Rng;
use vidshelf_core::constants::VIDEO_EXTENSIONS;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const STORED_NAME_TOKEN_LEN: usize = 6;
const FALLBACK_NAME: &str = "video";

/// Lowercase base36 token of `len` characters.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Runs of dots collapse to one dot and leading dots are dropped, so the result can never
/// be `.`/`..` or contain a `..` segment. An empty result becomes `video`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '.' && (out.is_empty() || out.ends_with('.')) {
            continue;
        }
        out.push(c);
    }
    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}

/// Collision-resistant stored name for an upload.
pub fn generate_stored_name(suggested_name: &str) -> String {
    format!(
        "{}-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        random_token(STORED_NAME_TOKEN_LEN),
        sanitize_file_name(suggested_name)
    )
}

/// Lowercase extension without the dot, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// The built-in video allowlist as owned strings.
pub fn default_video_extensions() -> Vec<String> {
    VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Lowercase, dot-free form of a configured allowlist.
pub fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Whether the name carries an extension from `allowed` (lowercase, without dot).
pub fn has_allowed_extension(file_name: &str, allowed: &[String]) -> bool {
    extension_of(file_name)
        .map(|ext| allowed.iter().any(|a| *a == ext))
        .unwrap_or(false)
}

/// File name without its extension.
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Content type served for a stored file, by extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",
        _ => "application/octet-stream",
    }
}

/// Reject names that could address anything outside the storage root.
///
/// The name must be a single path component other than `.` or `..`. Dots inside a
/// name (`clip..final.mp4`) are ordinary characters.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Invalid file name: {}",
            file_name
        )));
    }
    Ok(())
}
