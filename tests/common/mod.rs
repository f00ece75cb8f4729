//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use graphql_relay::config::RelayConfig;
use graphql_relay::http::HttpServer;
use graphql_relay::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// How a mock upstream answers.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Behavior {
    /// Fixed status and body.
    Fixed { status: u16, body: String },
    /// 200 with the received body sent back unchanged.
    Echo,
    /// Sleep, then answer 200 with `body`.
    Slow { delay: Duration, body: String },
    /// 307 to `location`.
    Redirect { location: String },
}

/// A request as the upstream saw it.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct UpstreamState {
    behavior: Behavior,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Handle to a running mock upstream.
#[allow(dead_code)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn upstream_handler(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().push(SeenRequest {
        headers,
        body: body.clone(),
    });

    match state.behavior {
        Behavior::Fixed { status, body } => {
            (StatusCode::from_u16(status).unwrap(), body).into_response()
        }
        Behavior::Echo => (StatusCode::OK, body).into_response(),
        Behavior::Slow { delay, body } => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, body).into_response()
        }
        Behavior::Redirect { location } => (
            StatusCode::TEMPORARY_REDIRECT,
            [(LOCATION, location)],
            "moved",
        )
            .into_response(),
    }
}

/// Start a mock upstream on an ephemeral port.
pub async fn start_upstream(behavior: Behavior) -> MockUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        behavior,
        hits: hits.clone(),
        seen: seen.clone(),
    };

    let app = Router::new()
        .route("/", any(upstream_handler))
        .route("/{*path}", any(upstream_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, hits, seen }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config suited to tests: local bind, no env proxy, short timeouts.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.use_env_proxy = false;
    config.upstream.connect_timeout_secs = 2;
    config.upstream.request_timeout_secs = 5;
    config
}

/// A running relay.
#[allow(dead_code)]
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<RelayConfig>,
}

#[allow(dead_code)]
impl RunningRelay {
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/graphql-proxy", self.addr)
    }
}

/// Start the relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    RunningRelay {
        addr,
        shutdown,
        config_updates,
    }
}

/// Test HTTP client that never goes through an environment proxy and
/// reports redirects instead of following them.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
