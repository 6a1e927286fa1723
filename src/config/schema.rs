//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resolver::host::{DEFAULT_ALIAS_LABEL, DEFAULT_REF_LABEL};
use crate::resolver::site_config::DEFAULT_CONFIG_FILENAME;

/// Root configuration for the static host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (site and control addresses).
    pub listener: ListenerConfig,

    /// Host resolution and routing settings.
    pub sites: SitesConfig,

    /// Object and metadata store settings.
    pub storage: StorageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Site traffic bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,

    /// Control (health) bind address.
    pub control_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            control_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Host resolution and routing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Domain suffix sites are served under (e.g., "nullserve.dev").
    pub domain_suffix: String,

    /// Subdomain label for direct deployment references (`<id>.sites.<suffix>`).
    pub ref_label: String,

    /// Subdomain label for named aliases (`<name>.site.<suffix>`).
    pub alias_label: String,

    /// Routing document file name under `.well-known/`.
    pub config_filename: String,

    /// Status returned when no routing rule matches.
    pub no_route_status: u16,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            domain_suffix: "nullserve.dev".to_string(),
            ref_label: DEFAULT_REF_LABEL.to_string(),
            alias_label: DEFAULT_ALIAS_LABEL.to_string(),
            config_filename: DEFAULT_CONFIG_FILENAME.to_string(),
            no_route_status: 404,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory of the filesystem object store.
    pub root: String,

    /// Key prefix deployments live under.
    pub prefix: String,

    /// JSON file with metadata items (site aliases). No aliases when unset.
    pub metadata_file: Option<String>,

    /// Timeout for a single store read, in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
            prefix: "site-deployments".to_string(),
            metadata_file: None,
            timeout_secs: 10,
        }
    }
}

/// Timeout configuration for request handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
