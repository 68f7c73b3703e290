//! Routing module for the catalog and basket service

use crate::state::SharedState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct RootMessage {
    pub message: String,
}

/// Endpoint: GET /
async fn root(State(state): State<SharedState>) -> Json<RootMessage> {
    Json(RootMessage {
        message: state.settings.welcome_message(),
    })
}

/// Builds the CORS layer from the configured origin whitelist.
///
/// Credentials are allowed, so methods and headers mirror the request
/// instead of using a wildcard.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        info!(method = %req.method(), uri = %req.uri(), "request");
        let res = next.run(req).await;
        if !res.status().is_success() {
            warn!(status = %res.status(), "request failed");
        }
        res
    });

    let cors = cors_layer(&state.settings.cors_origins);

    Router::new()
        .route("/", get(root))
        .merge(crate::catalog::routes())
        .merge(crate::basket::routes())
        .layer(log_layer)
        .layer(cors)
        .with_state(state)
}
