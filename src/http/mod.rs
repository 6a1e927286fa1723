//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, site handler)
//!     → request.rs (request ID, host extraction)
//!     → resolver (host → deployment, deployment → routing config)
//!     → routing (path → action, header merge)
//!     → error.rs (failures → generic JSON bodies)
//!     → Send to client
//!
//! Control address
//!     → control.rs (liveness, always "ok.")
//! ```

pub mod control;
pub mod error;
pub mod request;
pub mod server;

pub use control::ControlServer;
pub use error::ServeError;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
