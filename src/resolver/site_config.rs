//! Per-deployment routing configuration lookup.
//!
//! # Responsibilities
//! - Fetch `{prefix}/{deployment}/.well-known/<config-filename>`
//! - Fall back to the filesystem-only default when the document is absent
//! - Parse and validate the document; any defect fails the request
//! - List the deployment's objects when the document carries no manifest

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::resolver::DeploymentId;
use crate::routing::{Manifest, ParseError, RouteConfiguration};
use crate::storage::{key, with_timeout, ObjectStore, StoreError};

/// Directory holding the routing document inside a deployment.
pub const WELL_KNOWN_DIR: &str = ".well-known";

/// Default routing document file name.
pub const DEFAULT_CONFIG_FILENAME: &str = "static-host.json";

/// Errors obtaining a deployment's routing configuration.
#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error("failed to fetch routing document: {0}")]
    Fetch(#[source] StoreError),

    #[error("invalid routing document: {0}")]
    Parse(#[from] ParseError),
}

/// Loads routing configurations from the object store.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    objects: Arc<dyn ObjectStore>,
    config_filename: String,
    timeout: Duration,
}

impl ConfigResolver {
    pub fn new(objects: Arc<dyn ObjectStore>, config_filename: impl Into<String>, timeout: Duration) -> Self {
        Self {
            objects,
            config_filename: config_filename.into(),
            timeout,
        }
    }

    /// Path of the routing document relative to the deployment root.
    fn document_path(&self) -> String {
        key::join(&[WELL_KNOWN_DIR, &self.config_filename])
    }

    /// Object key of the routing document for `deployment_id`.
    pub fn config_key(&self, deployment_id: &DeploymentId, prefix: &str) -> String {
        key::join(&[
            &key::deployment_prefix(prefix, deployment_id.as_str()),
            &self.document_path(),
        ])
    }

    /// Fetch and parse the routing configuration for `deployment_id`.
    pub async fn resolve(
        &self,
        deployment_id: &DeploymentId,
        prefix: &str,
    ) -> Result<RouteConfiguration, SiteConfigError> {
        let config_key = self.config_key(deployment_id, prefix);

        let object = match with_timeout(self.timeout, self.objects.get_object(&config_key)).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    deployment_id = %deployment_id,
                    key = %config_key,
                    "No routing document, using filesystem default"
                );
                return Ok(RouteConfiguration::filesystem_default());
            }
            Err(e) => {
                tracing::error!(
                    deployment_id = %deployment_id,
                    key = %config_key,
                    error = %e,
                    "Object store error fetching routing document"
                );
                return Err(SiteConfigError::Fetch(e));
            }
        };

        RouteConfiguration::from_slice(&object.body).map_err(|e| {
            tracing::error!(
                deployment_id = %deployment_id,
                key = %config_key,
                error = %e,
                "Invalid routing document"
            );
            SiteConfigError::Parse(e)
        })
    }

    /// Build the manifest from the deployment's object listing.
    ///
    /// The routing document itself is not part of the manifest.
    pub async fn list_manifest(
        &self,
        deployment_id: &DeploymentId,
        prefix: &str,
    ) -> Result<Manifest, StoreError> {
        let base = key::deployment_prefix(prefix, deployment_id.as_str());
        let keys = with_timeout(self.timeout, self.objects.list_keys(&base)).await?;
        let document = self.document_path();
        Ok(Manifest::from_listing(keys, &base, &[document.as_str()]))
    }
}
