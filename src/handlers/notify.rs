use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::db::AppState;
use crate::kit::KitError;
use crate::notify::NotifyRequest;

/// Internal license-delivery endpoint.
///
/// Gated by the shared notify token (the sole authentication mechanism),
/// validates the delivery fields, and forwards the subscriber upsert to Kit.
/// Persists nothing - a pure translation layer between the internal contract
/// and Kit's API shape.
pub async fn handle_license_notify(State(state): State<AppState>, body: Bytes) -> Response {
    let request: NotifyRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid json").into_response(),
    };

    // Exact match against the shared secret; absent and empty tokens never
    // authenticate. Constant-time comparison keeps response timing from
    // leaking prefix matches.
    let authorized = request
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| bool::from(t.as_bytes().ct_eq(state.notify_token.as_bytes())))
        .unwrap_or(false);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }

    let email = request
        .email
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let license_key = request.license_key.as_deref().unwrap_or("").trim().to_string();
    let platform = request.platform.as_deref().unwrap_or("").trim().to_string();

    if email.is_empty() || license_key.is_empty() || platform.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing fields").into_response();
    }

    match state.kit.subscribe(&email, &license_key, &platform).await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(KitError::Upstream { status, body }) => {
            tracing::warn!("kit rejected subscribe: status={} body={}", status, body);
            (StatusCode::BAD_GATEWAY, format!("kit error: {}", body)).into_response()
        }
        Err(e) => {
            tracing::error!("kit request failed: {}", e);
            (StatusCode::BAD_GATEWAY, format!("kit error: {}", e)).into_response()
        }
    }
}
