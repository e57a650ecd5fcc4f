//! Custom problems · plugin service
//!
//! - Axum HTTP API: plugin manifest, problem rendering, task edits, submissions
//! - Plugin assets served from the configured static folder
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   PLUGIN_CONFIG_PATH : path to TOML config (upload defaults, folders, task file)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use custom_problems::routes::build_router;
use custom_problems::state::AppState;
use custom_problems::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, templates, problems from the task file.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "custom_problems", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
