//! Request helpers shared by handlers.

use axum::http::{header, HeaderMap};
use vidshelf_core::constants::DEFAULT_HOST;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Base URL the client used to reach us: `{x-forwarded-proto or http}://{host}`.
pub fn request_base_url(headers: &HeaderMap) -> String {
    let protocol = header_str(headers, FORWARDED_PROTO).unwrap_or("http");
    let host = header_str(headers, header::HOST.as_str()).unwrap_or(DEFAULT_HOST);
    format!("{}://{}", protocol, host)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
