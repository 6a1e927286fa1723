//! In-memory stores for development and tests.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use dashmap::DashMap;

use crate::resolver::host::{alias_key, ALIAS_KEY_PREFIX};
use crate::storage::{Item, MetadataStore, ObjectStore, StoreError, StoredObject};

/// Attribute holding an item's partition key.
pub const PARTITION_KEY: &str = "PartitionKey";

/// Attribute holding an item's sort key.
pub const SORT_KEY: &str = "SortKey";

/// In-memory [`ObjectStore`].
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` at `key` with the given content type.
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Bytes>, content_type: impl Into<String>) {
        let object = StoredObject::new(body, content_type, Utc::now());
        self.objects.insert(key.into(), object);
    }

    /// Make every read fail with a backend error (failure injection).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("object store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, key: &str) -> Result<StoredObject, StoreError> {
        self.check_available()?;
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let dir = format!("{}/", prefix.trim_end_matches('/'));
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.starts_with(&dir))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// In-memory [`MetadataStore`] keyed by `(PartitionKey, SortKey)`.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    items: DashMap<(String, String), Item>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load items from a JSON array of string-valued objects.
    ///
    /// Every object must carry `PartitionKey` and `SortKey` attributes.
    pub fn from_json_file(path: &Path) -> std::io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let items: Vec<Item> = serde_json::from_reader(reader)?;

        let store = Self::new();
        for item in items {
            store.insert(item).map_err(|message| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, message)
            })?;
        }
        tracing::info!(
            path = %path.display(),
            items = store.len(),
            "Loaded metadata items"
        );
        Ok(store)
    }

    /// Insert an item, keyed by its `PartitionKey` and `SortKey` attributes.
    ///
    /// Alias record keys (`Site#<name>`) are indexed with the name lowercased.
    pub fn insert(&self, item: Item) -> Result<(), String> {
        let partition = index_key(
            item.get(PARTITION_KEY)
                .ok_or_else(|| format!("item is missing {}", PARTITION_KEY))?,
        );
        let sort = index_key(
            item.get(SORT_KEY)
                .ok_or_else(|| format!("item is missing {}", SORT_KEY))?,
        );
        self.items.insert((partition, sort), item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `get_item` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every read fail with a backend error (failure injection).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

fn index_key(key: &str) -> String {
    match key.strip_prefix(ALIAS_KEY_PREFIX) {
        Some(alias) => alias_key(alias),
        None => key.to_string(),
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("metadata store unavailable".to_string()));
        }
        Ok(self
            .items
            .get(&(partition_key.to_string(), sort_key.to_string()))
            .map(|entry| entry.value().clone()))
    }
}
