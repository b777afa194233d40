//! The internal license-notify call made by the webhook ingestor.
//!
//! Delivery goes through the service's own /api/license-notify endpoint
//! rather than straight to Kit, so the delivery contract stays in one place
//! behind the shared token. The call is deliberately plain: no timeout, no
//! retry - webhook acknowledgement does not depend on it.

use serde::{Deserialize, Serialize};

/// Payload of the internal license-notify endpoint.
///
/// All fields optional at the parse layer; the notifier handler validates
/// presence after trimming so that a missing field is a 400, not a parse
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Outcome of the nested notify call, as seen by the ingestor.
#[derive(Debug)]
pub enum NotifyOutcome {
    /// The notifier answered 2xx - delivery handed off.
    Delivered,
    /// The notifier answered non-2xx; status and body kept for the audit
    /// record.
    Rejected { status: u16, body: String },
}

/// POST the notify payload to this service's own notify endpoint.
pub async fn send_license_notify(
    http: &reqwest::Client,
    base_url: &str,
    request: &NotifyRequest,
) -> reqwest::Result<NotifyOutcome> {
    let url = format!("{}/api/license-notify", base_url);

    let response = http.post(&url).json(request).send().await?;
    let status = response.status();

    if status.is_success() {
        Ok(NotifyOutcome::Delivered)
    } else {
        let body = response.text().await.unwrap_or_default();
        Ok(NotifyOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
