//! Static assets of the plugin (stylesheet, script), answered for GET and POST.

use std::sync::Arc;

use axum::{
  body::Body,
  extract::{Path, State},
  http::{Request, StatusCode},
  response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, instrument};

use crate::state::AppState;

#[instrument(level = "debug", skip(state), fields(%path))]
pub async fn static_asset(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
  // ServeDir only answers GET/HEAD, so every method is replayed as a GET.
  let uri = format!("/{}", path.trim_start_matches('/'));
  let req = match Request::builder().uri(uri.as_str()).body(Body::empty()) {
    Ok(req) => req,
    Err(e) => {
      debug!(target: "custom_problems", %path, error = %e, "Unservable asset path");
      return StatusCode::NOT_FOUND.into_response();
    }
  };

  match ServeDir::new(&state.config.static_dir).oneshot(req).await {
    Ok(res) => res.map(Body::new).into_response(),
    Err(never) => match never {},
  }
}
