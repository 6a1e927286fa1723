//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the object and metadata stores
//! - Install the metrics exporter when enabled
//! - Bind the site and control listeners
//! - Run both servers until a termination signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind last (traffic only when stores are ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::{ControlServer, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::storage::{FsObjectStore, MemoryMetadataStore, MetadataStore, ObjectStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load metadata file {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {field} {address}: {source}")]
    Bind {
        field: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{server} server failed: {source}")]
    Serve {
        server: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} server task panicked")]
    Join(&'static str),
}

/// Open the metadata store, seeded from a JSON file when one is configured.
pub fn open_metadata(config: &ServiceConfig) -> Result<MemoryMetadataStore, StartupError> {
    match &config.storage.metadata_file {
        Some(path) => MemoryMetadataStore::from_json_file(Path::new(path)).map_err(|source| {
            StartupError::Metadata {
                path: path.clone(),
                source,
            }
        }),
        None => {
            tracing::warn!("No metadata file configured, alias hosts will not resolve");
            Ok(MemoryMetadataStore::new())
        }
    }
}

async fn bind(field: &'static str, address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            field,
            address: address.to_string(),
            source,
        })
}

/// Run the service until SIGINT/SIGTERM.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let objects: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&config.storage.root));
    let metadata: Arc<dyn MetadataStore> = Arc::new(open_metadata(&config)?);
    tracing::info!(
        root = %config.storage.root,
        prefix = %config.storage.prefix,
        "Object store opened"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let site_listener = bind("listener.bind_address", &config.listener.bind_address).await?;
    let control_listener =
        bind("listener.control_address", &config.listener.control_address).await?;

    let shutdown = Arc::new(Shutdown::new());
    let site = HttpServer::new(config, objects, metadata);
    let site_task = tokio::spawn(site.run(site_listener, shutdown.subscribe()));
    let control_task = tokio::spawn(ControlServer::new().run(control_listener, shutdown.subscribe()));

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        trigger.trigger();
    });

    let site_result = site_task.await.map_err(|_| StartupError::Join("site"))?;
    // A failed site server must not leave the control server running.
    shutdown.trigger();
    let control_result = control_task.await.map_err(|_| StartupError::Join("control"))?;

    site_result.map_err(|source| StartupError::Serve {
        server: "site",
        source,
    })?;
    control_result.map_err(|source| StartupError::Serve {
        server: "control",
        source,
    })?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_metadata_without_file() {
        let store = open_metadata(&ServiceConfig::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_metadata_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"PartitionKey":"Site#blog","SortKey":"Site#blog","CurrentDeploymentId":"dep1"}}]"#
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.storage.metadata_file = Some(file.path().display().to_string());
        let store = open_metadata(&config).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_metadata_missing_file() {
        let mut config = ServiceConfig::default();
        config.storage.metadata_file = Some("/nonexistent/aliases.json".to_string());
        assert!(matches!(
            open_metadata(&config),
            Err(StartupError::Metadata { .. })
        ));
    }
}
