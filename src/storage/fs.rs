//! Object store backed by a directory on local disk.
//!
//! Object keys map onto relative paths under the root directory. Entity tags
//! are content hashes and `Last-Modified` comes from the file's mtime.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::storage::{ObjectStore, StoreError, StoredObject};

/// Filesystem-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root, refusing anything that could
    /// step outside it.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get_object(&self, key: &str) -> Result<StoredObject, StoreError> {
        let path = self
            .resolve(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(StoreError::NotFound(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let body = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io(e),
        })?;

        let last_modified: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(StoredObject::new(body, content_type_for(key), last_modified))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let Some(start) = self.resolve(prefix) else {
            return Ok(Vec::new());
        };

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Io(e)),
            };
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if let Some(key) = self.key_for(&path) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Guess a content type from the key's extension.
pub fn content_type_for(key: &str) -> String {
    let extension = Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let guessed = match extension.as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "js" | "mjs" => mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" | "map" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "xml" => mime::TEXT_XML,
        "svg" => mime::IMAGE_SVG,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "woff" => mime::FONT_WOFF,
        "woff2" => mime::FONT_WOFF2,
        "pdf" => mime::APPLICATION_PDF,
        "ico" => return "image/x-icon".to_string(),
        "webp" => return "image/webp".to_string(),
        "wasm" => return "application/wasm".to_string(),
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    guessed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, key: &str, body: &str) {
        let path = root.join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[tokio::test]
    async fn test_get_object() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "site-deployments/abc/index.html", "<h1>hi</h1>");
        let store = FsObjectStore::new(dir.path());

        let object = store.get_object("site-deployments/abc/index.html").await.unwrap();
        assert_eq!(&object.body[..], b"<h1>hi</h1>");
        assert_eq!(object.content_type, "text/html; charset=utf-8");
        assert_eq!(object.content_length(), 11);
        assert!(object.etag.starts_with('"'));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "site-deployments/abc/index.html", "x");
        let store = FsObjectStore::new(dir.path());

        let err = store.get_object("site-deployments/abc/nope.html").await.unwrap_err();
        assert!(err.is_not_found());

        // Directories are not objects.
        let err = store.get_object("site-deployments/abc").await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.get_object("../etc/passwd").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_keys() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "site-deployments/abc/index.html", "x");
        write(dir.path(), "site-deployments/abc/css/site.css", "x");
        write(dir.path(), "site-deployments/other/index.html", "x");
        let store = FsObjectStore::new(dir.path());

        let keys = store.list_keys("site-deployments/abc").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "site-deployments/abc/css/site.css".to_string(),
                "site-deployments/abc/index.html".to_string(),
            ]
        );

        assert!(store.list_keys("site-deployments/missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b/site.CSS"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("app.wasm"), "application/wasm");
        assert_eq!(content_type_for("LICENSE"), "application/octet-stream");
    }
}
