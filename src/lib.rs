//! Static site hosting front end.
//!
//! Maps an incoming `(host, path)` pair onto an object inside an immutable
//! deployment, driven by a per-deployment routing document.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ resolver::host ──▶ DeploymentId
//!                          │                 │
//!                          │                 └── storage (alias metadata)
//!                          ▼
//!                     resolver::site_config ──▶ RouteConfiguration
//!                          │                       │
//!                          │                       └── storage (routing document)
//!                          ▼
//!                     routing::matcher ──▶ Action
//!                          │
//!                          ▼
//!                     storage (object) ──▶ routing::headers ──▶ Response
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;
pub mod storage;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteConfiguration;
