//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! Host resolver ──get_item──▶ MetadataStore (alias records)
//!
//! Config resolver ──get_object──▶ ObjectStore (routing document)
//!                 ──list_keys───▶ ObjectStore (deployment manifest)
//!
//! Site handler ──get_object──▶ ObjectStore (resolved object)
//! ```
//!
//! # Design Decisions
//! - Stores are trait objects so cloud clients can replace the bundled ones
//! - "Not found" is a distinct error kind; callers decide whether it is fatal
//! - Every read is bounded by [`with_timeout`]; nothing here retries

pub mod fs;
pub mod key;
pub mod memory;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use fs::FsObjectStore;
pub use memory::{MemoryMetadataStore, MemoryObjectStore};

/// Errors surfaced by object and metadata stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no object at key {0}")]
    NotFound(String),

    #[error("store request timed out after {0:?}")]
    Timeout(Duration),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// An object read from the object store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl StoredObject {
    /// Build an object, deriving its entity tag from the content.
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        let body = body.into();
        let etag = content_etag(&body);
        Self {
            body,
            content_type: content_type.into(),
            etag,
            last_modified,
        }
    }

    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Quoted SHA-256 entity tag for `body`.
pub fn content_etag(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// A metadata item: attribute name → string value.
pub type Item = HashMap<String, String>;

/// Read access to deployment objects.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Fetch the object stored at `key`.
    async fn get_object(&self, key: &str) -> Result<StoredObject, StoreError>;

    /// List every key under `prefix` (a directory-like key ending without `/`).
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Read access to the site metadata table.
#[async_trait]
pub trait MetadataStore: Send + Sync + std::fmt::Debug {
    /// Fetch the item with the given composite key, if any.
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>, StoreError>;
}

/// Bound a store read by `limit`, mapping expiry to [`StoreError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, read: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, read).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
