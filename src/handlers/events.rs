use axum::{body::Bytes, extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::db::AppState;
use crate::extract;

/// Liveness probe that exercises the events store end to end.
pub async fn selftest(State(state): State<AppState>) -> (StatusCode, &'static str) {
    state.audit.record("selftest", &json!({ "ping": true }));
    (StatusCode::OK, "selftest ok")
}

/// Generic event recorder for unclassified provider callbacks.
///
/// Accepts any method, infers a type label from the body when it can, and
/// always acknowledges - an unclassifiable event is still worth keeping.
pub async fn record_provider_event(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
    let event_type = extract::event_type_or(&payload, "event");
    state.audit.record(&event_type, &payload);
    (StatusCode::OK, "ok")
}
