//! HTTP server setup and the site request handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all site handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Resolve host → deployment → routing config → action → object
//! - Merge response headers and stream the object body
//! - Observability (metrics, request IDs in logs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::error::ServeError;
use crate::http::request::{request_host, request_id, RequestUuid, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resolver::{ConfigResolver, HostError, HostResolver};
use crate::routing::{headers, match_route};
use crate::routing::headers::BaseHeaders;
use crate::storage::{key, with_timeout, MetadataStore, ObjectStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub hosts: Arc<HostResolver>,
    pub configs: Arc<ConfigResolver>,
    pub objects: Arc<dyn ObjectStore>,
    pub domain_suffix: Arc<str>,
    pub storage_prefix: Arc<str>,
    pub no_route_status: StatusCode,
    pub store_timeout: Duration,
}

impl AppState {
    /// Build handler state from configuration and store handles.
    pub fn new(
        config: &ServiceConfig,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let store_timeout = Duration::from_secs(config.storage.timeout_secs);
        let hosts = HostResolver::with_labels(
            metadata,
            config.sites.ref_label.clone(),
            config.sites.alias_label.clone(),
            store_timeout,
        );
        let configs = ConfigResolver::new(
            objects.clone(),
            config.sites.config_filename.clone(),
            store_timeout,
        );

        Self {
            hosts: Arc::new(hosts),
            configs: Arc::new(configs),
            objects,
            domain_suffix: config.sites.domain_suffix.to_ascii_lowercase().into(),
            storage_prefix: config.storage.prefix.as_str().into(),
            no_route_status: StatusCode::from_u16(config.sites.no_route_status)
                .unwrap_or(StatusCode::NOT_FOUND),
            store_timeout,
        }
    }
}

/// HTTP server for site traffic.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and stores.
    pub fn new(
        config: ServiceConfig,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let state = AppState::new(&config, objects, metadata);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            domain_suffix = %self.config.sites.domain_suffix,
            "Site server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("Site server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/", any(site_handler))
        .route("/{*path}", any(site_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %request_id(request.headers()),
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
        .layer(SetRequestIdLayer::new(x_request_id, RequestUuid))
}

/// Site handler.
/// Resolves the deployment and path, then serves the matched object.
async fn site_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let host = request_host(request.headers(), request.uri()).unwrap_or_default();
    let path = decode_path(request.uri().path());

    match serve(&state, &host, &path).await {
        Ok(response) => {
            metrics::record_request("served", response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    host = %host,
                    path = %path,
                    status = status.as_u16(),
                    error = %e,
                    "Request failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    host = %host,
                    path = %path,
                    status = status.as_u16(),
                    error = %e,
                    "Request not served"
                );
            }
            metrics::record_request(e.outcome(), status.as_u16(), start_time);
            e.into_response()
        }
    }
}

async fn serve(state: &AppState, host: &str, path: &str) -> Result<Response, ServeError> {
    if host.is_empty() {
        return Err(HostError::NoSuffixMatch.into());
    }

    let deployment = state.hosts.resolve(host, &state.domain_suffix).await?;
    let config = state.configs.resolve(&deployment, &state.storage_prefix).await?;

    let listed;
    let manifest = match config.manifest() {
        Some(manifest) => manifest,
        None => {
            listed = state
                .configs
                .list_manifest(&deployment, &state.storage_prefix)
                .await
                .map_err(ServeError::Manifest)?;
            &listed
        }
    };

    let action = match_route(&config, manifest, path).map_err(|_| ServeError::NoRoute {
        status: state.no_route_status,
    })?;

    tracing::debug!(
        deployment_id = %deployment,
        path = %path,
        destination = %action.destination_key,
        status = action.status_code,
        "Route matched"
    );

    let object_key = key::object_key(&state.storage_prefix, deployment.as_str(), &action.destination_key);
    let object = with_timeout(state.store_timeout, state.objects.get_object(&object_key))
        .await
        .map_err(ServeError::Object)?;

    let base = BaseHeaders {
        content_type: object.content_type.clone(),
        content_length: object.content_length(),
        etag: object.etag.clone(),
        last_modified: object.last_modified,
    };
    let merged = headers::apply(base.into_header_map(), &action.headers);

    let mut response = Response::new(Body::from(object.body));
    *response.status_mut() = StatusCode::from_u16(action.status_code).unwrap_or(StatusCode::OK);
    *response.headers_mut() = merged;
    Ok(response)
}

/// Percent-decode the request path; keep it raw if it is not valid UTF-8.
fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
