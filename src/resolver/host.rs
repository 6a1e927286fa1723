//! Hostname to deployment resolution.
//!
//! # Responsibilities
//! - Check the host against the configured domain suffix
//! - `<id>.sites.<suffix>`: the label is the deployment id (no I/O)
//! - `<name>.site.<suffix>`: look up alias `name` in the metadata store
//!
//! # Design Decisions
//! - A missing alias is reported as `NoSuchSuffix`, same as an unknown scheme
//! - At most one metadata read per request, only on the alias branch
//! - Labels that are empty or path-like (`.`, `..`, containing `/`) are
//!   rejected so they can never widen an object key

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::observability::metrics;
use crate::resolver::DeploymentId;
use crate::storage::{with_timeout, MetadataStore, StoreError};

/// Prefix of alias record keys in the metadata store.
pub const ALIAS_KEY_PREFIX: &str = "Site#";

/// Metadata key of the record for `alias`.
///
/// Host names reach the resolver lowercased, so alias names are compared in
/// lowercase too.
pub fn alias_key(alias: &str) -> String {
    format!("{}{}", ALIAS_KEY_PREFIX, alias.to_ascii_lowercase())
}

/// Attribute of an alias record naming its current deployment.
pub const CURRENT_DEPLOYMENT_ATTRIBUTE: &str = "CurrentDeploymentId";

/// Default subdomain label for direct deployment references.
pub const DEFAULT_REF_LABEL: &str = "sites";

/// Default subdomain label for named aliases.
pub const DEFAULT_ALIAS_LABEL: &str = "site";

/// Errors resolving a host to a deployment.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host does not have the configured suffix")]
    NoSuffixMatch,

    #[error("host does not name a known site")]
    NoSuchSuffix,

    #[error("metadata store error: {0}")]
    MetadataStore(#[source] StoreError),
}

/// Resolves request hosts to deployment identifiers.
#[derive(Debug, Clone)]
pub struct HostResolver {
    metadata: Arc<dyn MetadataStore>,
    ref_label: String,
    alias_label: String,
    timeout: Duration,
}

impl HostResolver {
    /// Create a resolver using the default `sites` / `site` labels.
    pub fn new(metadata: Arc<dyn MetadataStore>, timeout: Duration) -> Self {
        Self::with_labels(metadata, DEFAULT_REF_LABEL, DEFAULT_ALIAS_LABEL, timeout)
    }

    pub fn with_labels(
        metadata: Arc<dyn MetadataStore>,
        ref_label: impl Into<String>,
        alias_label: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            metadata,
            ref_label: ref_label.into(),
            alias_label: alias_label.into(),
            timeout,
        }
    }

    /// Resolve `host` (already stripped of any port) under `suffix`.
    pub async fn resolve(&self, host: &str, suffix: &str) -> Result<DeploymentId, HostError> {
        let labels = host
            .strip_suffix(suffix)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or(HostError::NoSuffixMatch)?;

        if let Some(reference) = strip_label(labels, &self.ref_label) {
            return if is_segment(reference) {
                Ok(DeploymentId::new(reference))
            } else {
                Err(HostError::NoSuchSuffix)
            };
        }

        if let Some(alias) = strip_label(labels, &self.alias_label) {
            if !is_segment(alias) {
                return Err(HostError::NoSuchSuffix);
            }
            return self.lookup_alias(alias).await;
        }

        Err(HostError::NoSuchSuffix)
    }

    async fn lookup_alias(&self, alias: &str) -> Result<DeploymentId, HostError> {
        let key = alias_key(alias);
        let item = with_timeout(self.timeout, self.metadata.get_item(&key, &key))
            .await
            .map_err(|e| {
                metrics::record_alias_lookup("error");
                HostError::MetadataStore(e)
            })?;

        let deployment = item
            .and_then(|mut item| item.remove(CURRENT_DEPLOYMENT_ATTRIBUTE))
            .filter(|id| is_segment(id));

        match deployment {
            Some(id) => {
                metrics::record_alias_lookup("found");
                tracing::debug!(alias = %alias, deployment_id = %id, "Resolved site alias");
                Ok(DeploymentId::new(id))
            }
            None => {
                metrics::record_alias_lookup("missing");
                tracing::debug!(alias = %alias, "No current deployment for site alias");
                Err(HostError::NoSuchSuffix)
            }
        }
    }
}

/// Strip `.<label>` from the end of `labels`, returning what precedes it.
fn strip_label<'a>(labels: &'a str, label: &str) -> Option<&'a str> {
    labels.strip_suffix(label)?.strip_suffix('.')
}

/// A value usable as a single object key segment.
fn is_segment(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\'])
}
