//! Response header merging.
//!
//! Base headers describing the object are written first, one value per key.
//! Rule directives are then applied in order: `overwrite` replaces every value
//! for the key, otherwise the value is appended next to existing ones.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Utc};

use crate::routing::rules::HeaderDirective;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "StaticHost";

/// Object-derived headers present on every successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseHeaders {
    pub content_type: String,
    pub content_length: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl BaseHeaders {
    pub fn into_header_map(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.content_length));
        headers.insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));
        if let Ok(etag) = HeaderValue::from_str(&self.etag) {
            headers.insert(header::ETAG, etag);
        }
        if let Ok(modified) = HeaderValue::from_str(&http_date(self.last_modified)) {
            headers.insert(header::LAST_MODIFIED, modified);
        }
        headers
    }
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Apply rule directives on top of `base`.
pub fn apply(mut base: HeaderMap, directives: &[HeaderDirective]) -> HeaderMap {
    for directive in directives {
        let name = match HeaderName::from_bytes(directive.key.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::debug!(key = %directive.key, "Skipping header directive with invalid name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(&directive.value) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(key = %directive.key, "Skipping header directive with invalid value");
                continue;
            }
        };

        if directive.overwrite {
            base.insert(name, value);
        } else {
            base.append(name, value);
        }
    }
    base
}
