//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The relay exposes a single WebSocket endpoint at `/` — the fixed address
//! the device simulator and control panels dial (`ws://localhost:8765`) —
//! plus a health probe. CORS is wide open: everything speaking to this
//! server runs on the same machine.

pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
