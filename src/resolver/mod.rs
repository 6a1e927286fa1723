//! Request resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Host header
//!     → host.rs (suffix match, ref or alias lookup)
//!     → DeploymentId
//!     → site_config.rs (fetch + parse routing document, or default)
//!     → RouteConfiguration
//! ```
//!
//! # Design Decisions
//! - Resolvers are stateless apart from store handles; safe to share via Arc
//! - Nothing is cached: every request reads its own document
//! - Host resolution completes before the configuration is fetched

pub mod host;
pub mod site_config;

use std::fmt;

pub use host::{HostError, HostResolver};
pub use site_config::{ConfigResolver, SiteConfigError};

/// Opaque identifier of a deployment's content set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentId(String);

impl DeploymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DeploymentId> for String {
    fn from(id: DeploymentId) -> Self {
        id.0
    }
}
