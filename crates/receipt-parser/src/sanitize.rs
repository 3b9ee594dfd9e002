//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Span fields carry file names and short hashes only; directory paths,
//! credentials in URLs and signed query strings stay out of traces.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Returns the last component of a document name that may carry a folder prefix.
pub fn redact_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.is_empty() {
        "<unknown>".to_string()
    } else {
        base.to_string()
    }
}

/// Strips userinfo and the query string from a URL.
///
/// - `https://user:pw@host/path?sig=abc` -> `https://****@host/path`
/// - `https://host/ops/1?api-version=2023-07-31` -> `https://host/ops/1`
pub fn redact_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);

    if let Some(scheme_end) = without_query.find("://") {
        let after_scheme = &without_query[scheme_end + 3..];
        let authority_end = after_scheme.find('/').unwrap_or(after_scheme.len());
        if let Some(at_pos) = after_scheme[..authority_end].rfind('@') {
            let scheme = &without_query[..scheme_end + 3];
            return format!("{}****@{}", scheme, &after_scheme[at_pos + 1..]);
        }
    }

    without_query.to_string()
}

/// Short deterministic hash of an opaque identifier, for correlating log
/// lines without exposing the identifier.
pub fn hash_id(id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
