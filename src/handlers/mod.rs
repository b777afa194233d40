pub mod events;
pub mod notify;
pub mod webhook;

pub use events::{record_provider_event, selftest};
pub use notify::handle_license_notify;
pub use webhook::handle_paddle_webhook;

use axum::{
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/paddle-webhook", post(handle_paddle_webhook))
        .route("/api/license-notify", post(handle_license_notify))
        .route("/api/selftest", get(selftest))
        // Catch-all recorder for provider callbacks without a dedicated handler
        .route("/api/events", any(record_provider_event))
}
