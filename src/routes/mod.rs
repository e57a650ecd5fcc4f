//! Router assembly: HTTP endpoints, plugin static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::plugin::STATIC_ROUTE;
use crate::state::AppState;

pub mod assets;
pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...` (plugin manifest, problems, submissions)
/// - Plugin assets under `/plugins/custom/static/`, for GET and POST
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_route = format!("{}/*path", STATIC_ROUTE);

    Router::new()
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/plugin", get(http::http_get_plugin))
        .route("/api/v1/problems", get(http::http_list_problems))
        .route("/api/v1/problems/:problem_id", put(http::http_put_problem))
        .route("/api/v1/problems/:problem_id/input", get(http::http_get_problem_input))
        .route("/api/v1/problems/:problem_id/editbox", get(http::http_get_editbox))
        .route("/api/v1/problems/:problem_id/submit", post(http::http_post_submit))
        .route("/api/v1/problems/:problem_id/check", post(http::http_post_check))
        // Plugin assets
        .route(&static_route, get(assets::static_asset).post(assets::static_asset))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
