//! Shared utilities for integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use static_host::config::ServiceConfig;
use static_host::http::HttpServer;
use static_host::storage::{MemoryMetadataStore, MemoryObjectStore};

pub const SUFFIX: &str = "example.test";
pub const PREFIX: &str = "site-deployments";

/// In-memory stores behind a fully layered site router.
pub struct TestSite {
    pub objects: Arc<MemoryObjectStore>,
    pub metadata: Arc<MemoryMetadataStore>,
    pub router: Router,
}

impl TestSite {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let objects = Arc::new(MemoryObjectStore::new());
        let metadata = Arc::new(MemoryMetadataStore::new());
        let server = HttpServer::new(config, objects.clone(), metadata.clone());
        Self {
            objects,
            metadata,
            router: server.router(),
        }
    }

    /// Store an object of `deployment` at `path`.
    pub fn put(&self, deployment: &str, path: &str, body: &str, content_type: &str) {
        let key = format!("{}/{}/{}", PREFIX, deployment, path.trim_start_matches('/'));
        self.objects.insert(key, body.to_string(), content_type);
    }

    /// Store the routing document of `deployment`.
    pub fn put_document(&self, deployment: &str, document: &str) {
        self.put(
            deployment,
            "/.well-known/static-host.json",
            document,
            "application/json",
        );
    }

    /// Point `alias` at `deployment`.
    #[allow(dead_code)]
    pub fn put_alias(&self, alias: &str, deployment: &str) {
        let key = format!("Site#{}", alias);
        let item = [
            ("PartitionKey".to_string(), key.clone()),
            ("SortKey".to_string(), key),
            ("CurrentDeploymentId".to_string(), deployment.to_string()),
        ]
        .into_iter()
        .collect();
        self.metadata.insert(item).unwrap();
    }

    pub async fn get(&self, host: &str, path: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(path)
            .header("host", host)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.sites.domain_suffix = SUFFIX.to_string();
    config.storage.prefix = PREFIX.to_string();
    config
}

/// Host addressing `deployment` directly.
pub fn ref_host(deployment: &str) -> String {
    format!("{}.sites.{}", deployment, SUFFIX)
}

/// Host addressing a site alias.
#[allow(dead_code)]
pub fn alias_host(alias: &str) -> String {
    format!("{}.site.{}", alias, SUFFIX)
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
