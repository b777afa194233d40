use axum::{body::Bytes, extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::db::queries::{self, ProvisionOutcome};
use crate::db::AppState;
use crate::extract::{self, Platform};
use crate::keys::generate_license_key;
use crate::models::UpsertSubscription;
use crate::notify::{send_license_notify, NotifyOutcome, NotifyRequest};

/// Paddle v2 webhook (POST-only).
///
/// Records the raw event, extracts fields tolerantly, upserts
/// customer/subscription state, provisions a license on success-like
/// statuses, and hands delivery to the notify endpoint. The provider gets a
/// 200 unless the body is unparseable or a core write irrecoverably fails -
/// a downstream delivery failure must never trigger provider-side
/// redelivery.
pub async fn handle_paddle_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    // An empty body is an empty event, not an error
    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("unparseable webhook body: {}", e);
                state
                    .audit
                    .record("webhook.error", &json!({ "reason": "invalid json" }));
                return (StatusCode::BAD_REQUEST, "invalid json");
            }
        }
    };

    // Keep the raw event before doing anything with it
    let event_type = extract::event_type(&payload);
    state.audit.record(&event_type, &payload);

    let price_id = extract::price_id(&payload);
    let transaction_id = extract::transaction_id(&payload);
    let status = extract::status(&payload);
    let platform = Platform::from_price_id(price_id.as_deref());

    // Absence of email is not an error - there is just nothing to attach
    // state to
    let Some(email) = extract::customer_email(&payload) else {
        state
            .audit
            .record("webhook.note", &json!({ "note": "no email in payload" }));
        return (StatusCode::OK, "ok (no email)");
    };

    let conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "database error");
        }
    };

    // Insert-or-ignore, then re-read the surrogate id
    if let Err(e) = queries::upsert_customer(&conn, &email) {
        tracing::error!("customer upsert failed: {}", e);
        state.audit.record(
            "webhook.error",
            &json!({ "reason": "customer upsert failed", "email": email }),
        );
        return (StatusCode::INTERNAL_SERVER_ERROR, "customer upsert failed");
    }

    let customer = match queries::get_customer_by_email(&conn, &email) {
        Ok(Some(c)) => c,
        Ok(None) => {
            state.audit.record(
                "webhook.error",
                &json!({ "reason": "customer upsert failed", "email": email }),
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "customer upsert failed");
        }
        Err(e) => {
            tracing::error!("customer lookup failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "database error");
        }
    };

    // Last write wins on replays and out-of-order deliveries
    if let Some(tx_id) = transaction_id.as_deref() {
        let input = UpsertSubscription {
            customer_id: &customer.id,
            paddle_transaction_id: tx_id,
            product_label: platform.as_ref(),
            price_id: price_id.as_deref(),
            status: &status,
        };
        if let Err(e) = queries::upsert_subscription(&conn, &input) {
            tracing::error!("subscription upsert failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "database error");
        }
    }

    // License provisioning gate: success-like status and a recognized
    // platform ("dual" provisions as its own platform)
    if extract::is_success_status(&status) && platform.is_known() {
        let platform: &str = platform.as_ref();

        let outcome =
            match queries::provision_license(&conn, &customer.id, platform, &generate_license_key())
            {
                Ok(o) => o,
                Err(e) => {
                    tracing::error!("license provisioning failed: {}", e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "database error");
                }
            };

        let (license, created) = match outcome {
            ProvisionOutcome::Created(l) => (l, true),
            ProvisionOutcome::Existing(l) => (l, false),
        };

        if created {
            state.audit.record(
                "license.created",
                &json!({
                    "email": email,
                    "platform": platform,
                    "license_key": license.license_key,
                }),
            );
        }

        // Re-notify on every delivery until a delivery call has succeeded
        let needs_notify = created || !license.notified;

        if needs_notify {
            state
                .audit
                .record("notify.attempt", &json!({ "email": email, "platform": platform }));

            let request = NotifyRequest {
                token: Some(state.notify_token.clone()),
                email: Some(email.clone()),
                license_key: Some(license.license_key.clone()),
                platform: Some(platform.to_string()),
            };

            match send_license_notify(&state.http, &state.base_url, &request).await {
                Ok(NotifyOutcome::Delivered) => {
                    // Scoped to the exact key so an unrelated row is never touched
                    match queries::mark_license_notified(
                        &conn,
                        &customer.id,
                        platform,
                        &license.license_key,
                    ) {
                        Ok(_) => state
                            .audit
                            .record("notify.ok", &json!({ "email": email, "platform": platform })),
                        Err(e) => {
                            tracing::error!("failed to mark license notified: {}", e);
                            state
                                .audit
                                .record("notify.error", &json!({ "message": e.to_string() }));
                        }
                    }
                }
                Ok(NotifyOutcome::Rejected { status, body }) => {
                    tracing::warn!("notify rejected: status={} body={}", status, body);
                    state
                        .audit
                        .record("notify.fail", &json!({ "status": status, "errText": body }));
                }
                Err(e) => {
                    tracing::warn!("notify call failed: {}", e);
                    state
                        .audit
                        .record("notify.error", &json!({ "message": e.to_string() }));
                }
            }
        }
    }

    (StatusCode::OK, "ok")
}
