//! Cross-origin headers for browser callers.

use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS layer: any origin, method and header, no credentials.
///
/// The relay exists so browsers can reach third-party GraphQL servers, so
/// its own endpoint has to be reachable from any page that embeds it.
pub fn permissive_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
}
