//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and health handlers
//! - Wire up middleware (request ID, tracing, CORS, limits, timeout)
//! - Serve on a plain listener or over TLS
//! - Swap in a rebuilt relay when a new configuration arrives
//! - Record per-call metrics and logs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::cors;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for as wait_for_shutdown;
use crate::observability::metrics;
use crate::relay::{Relay, RelayBuildError, RelayError};

/// Grace period given to in-flight TLS connections on shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ArcSwap<Relay>>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    relay: Arc<ArcSwap<Relay>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, RelayBuildError> {
        let relay = Relay::from_config(&config)?;
        warn_if_open(&relay);

        let relay = Arc::new(ArcSwap::from_pointee(relay));
        let state = AppState {
            relay: relay.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            relay,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(&config.relay.path, post(relay_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.relay.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections));

        if config.relay.cors {
            router = router.layer(cors::permissive_layer());
        }

        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config the server was started with.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the running relay.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            "HTTP server starting"
        );

        tokio::spawn(apply_config_updates(
            self.relay.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve over TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            wait_for_shutdown(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        tokio::spawn(apply_config_updates(
            self.relay.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Relay endpoint handler.
async fn relay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    tracing::debug!(
        request_id = %request_id,
        body_len = body.len(),
        "Relay request received"
    );

    let relay = state.relay.load_full();
    match relay.relay(&request_id, &headers, body).await {
        Ok(data) => {
            metrics::record_relay("success", StatusCode::OK.as_u16(), start);
            tracing::info!(
                request_id = %request_id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Relay succeeded"
            );
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(err) => {
            let status = err.status();
            metrics::record_relay(err.outcome(), status.as_u16(), start);
            match &err {
                RelayError::Internal(message) => {
                    tracing::error!(request_id = %request_id, error = %message, "Relay failed");
                }
                RelayError::Upstream { details, .. } => {
                    tracing::warn!(
                        request_id = %request_id,
                        status = %status,
                        details = %details,
                        "Upstream returned an error"
                    );
                }
                _ => {
                    tracing::warn!(request_id = %request_id, status = %status, error = %err, "Relay request rejected");
                }
            }
            err.into_response()
        }
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn warn_if_open(relay: &Relay) {
    if relay.is_open() {
        tracing::warn!("No allowed_hosts configured: relay will forward to any host");
    }
}

/// Rebuild the relay for every configuration received until the channel closes.
async fn apply_config_updates(
    relay: Arc<ArcSwap<Relay>>,
    startup: RelayConfig,
    mut updates: mpsc::UnboundedReceiver<RelayConfig>,
) {
    while let Some(config) = updates.recv().await {
        if requires_restart(&startup, &config) {
            tracing::warn!("Listener, path, CORS and body limit changes take effect after a restart");
        }

        match Relay::from_config(&config) {
            Ok(next) => {
                warn_if_open(&next);
                relay.store(Arc::new(next));
                tracing::info!(
                    allowed_hosts = config.relay.allowed_hosts.len(),
                    "Relay configuration reloaded"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to apply new configuration, keeping current relay");
            }
        }
    }
}

fn requires_restart(current: &RelayConfig, next: &RelayConfig) -> bool {
    current.listener.bind_address != next.listener.bind_address
        || current.listener.max_connections != next.listener.max_connections
        || current.listener.request_timeout_secs != next.listener.request_timeout_secs
        || current.relay.path != next.relay.path
        || current.relay.cors != next.relay.cors
        || current.relay.max_body_bytes != next.relay.max_body_bytes
}
