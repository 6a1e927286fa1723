//! Request failure taxonomy and its mapping to HTTP responses.
//!
//! Clients only ever see the canonical reason phrase of the status; the
//! underlying error is logged by the handler.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::resolver::{HostError, SiteConfigError};
use crate::storage::StoreError;

/// Content type of error bodies.
pub const ERROR_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Everything that can end a site request before the object is served.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("host resolution failed: {0}")]
    Host(#[from] HostError),

    #[error(transparent)]
    SiteConfig(#[from] SiteConfigError),

    #[error("failed to list deployment objects: {0}")]
    Manifest(#[source] StoreError),

    #[error("no route matched the path requested")]
    NoRoute { status: StatusCode },

    #[error("failed to fetch resolved object: {0}")]
    Object(#[source] StoreError),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Host(_) => StatusCode::BAD_GATEWAY,
            ServeError::SiteConfig(_) | ServeError::Manifest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServeError::NoRoute { status } => *status,
            ServeError::Object(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ServeError::Object(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Metrics label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            ServeError::Host(HostError::MetadataStore(_)) => "metadata_error",
            ServeError::Host(_) => "unknown_host",
            ServeError::SiteConfig(SiteConfigError::Fetch(_)) => "config_fetch_error",
            ServeError::SiteConfig(SiteConfigError::Parse(_)) => "config_parse_error",
            ServeError::Manifest(_) => "manifest_error",
            ServeError::NoRoute { .. } => "no_route",
            ServeError::Object(_) => "object_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: &'static str,
}

/// Build the generic JSON error response for `status`.
pub fn error_response(status: StatusCode) -> Response {
    let body = ErrorBody {
        error: ErrorMessage {
            message: status.canonical_reason().unwrap_or("Error"),
        },
    };
    let bytes = serde_json::to_vec(&body).unwrap_or_default();

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(ERROR_CONTENT_TYPE));
    response
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        error_response(self.status())
    }
}
