//! Control listener for liveness probes.
//!
//! Every request on the control address answers `200 ok.`, independent of
//! host or path. It never touches the stores.

use axum::{http::StatusCode, response::IntoResponse, Router};
use tokio::net::TcpListener;

use crate::lifecycle::ShutdownSignal;

/// Body returned by the control endpoint.
pub const CONTROL_BODY: &str = "ok.";

/// Build the control router.
pub fn control_router() -> Router {
    Router::new().fallback(control_handler)
}

async fn control_handler() -> impl IntoResponse {
    (StatusCode::OK, CONTROL_BODY)
}

/// Liveness server bound to the control address.
pub struct ControlServer {
    router: Router,
}

impl ControlServer {
    pub fn new() -> Self {
        Self {
            router: control_router(),
        }
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Control server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("Control server stopped");
        Ok(())
    }
}

impl Default for ControlServer {
    fn default() -> Self {
        Self::new()
    }
}
