//! Tolerant field extraction from Paddle webhook payloads.
//!
//! Paddle v2 payloads vary in shape across event types and API versions, so
//! every datum is looked up through an explicit ordered list of accessor
//! functions - the first non-null hit wins. Missing fields are normal, not
//! errors.

use serde_json::Value;
use strum::{AsRefStr, EnumString};

type Accessor = fn(&Value) -> Option<&Value>;

/// Paddle v2 usually nests the transaction under `data`; older shapes put it
/// at the top level.
fn envelope(payload: &Value) -> &Value {
    payload.get("data").unwrap_or(payload)
}

/// Evaluate accessors in priority order, returning the first non-null value.
fn first_value<'a>(value: &'a Value, accessors: &[Accessor]) -> Option<&'a Value> {
    accessors
        .iter()
        .filter_map(|accessor| accessor(value))
        .find(|v| !v.is_null())
}

fn first_string(value: &Value, accessors: &[Accessor]) -> Option<String> {
    first_value(value, accessors)
        .and_then(Value::as_str)
        .map(str::to_string)
}

// Accessors, one candidate path each.

fn nested_customer_email(v: &Value) -> Option<&Value> {
    v.get("customer")?.get("email")
}

fn flat_customer_email(v: &Value) -> Option<&Value> {
    v.get("customer_email")
}

fn nested_user_email(v: &Value) -> Option<&Value> {
    v.get("user")?.get("email")
}

fn first_item_price_id(v: &Value) -> Option<&Value> {
    v.get("items")?.get(0)?.get("price")?.get("id")
}

fn first_item_flat_price_id(v: &Value) -> Option<&Value> {
    v.get("items")?.get(0)?.get("price_id")
}

fn plain_id(v: &Value) -> Option<&Value> {
    v.get("id")
}

fn flat_transaction_id(v: &Value) -> Option<&Value> {
    v.get("transaction_id")
}

fn plain_status(v: &Value) -> Option<&Value> {
    v.get("status")
}

fn plain_event_type(v: &Value) -> Option<&Value> {
    v.get("event_type")
}

fn plain_type(v: &Value) -> Option<&Value> {
    v.get("type")
}

/// Best-effort event type label for the audit record.
pub fn event_type(payload: &Value) -> String {
    event_type_or(payload, "transaction")
}

/// Like [`event_type`], with a caller-supplied fallback label.
pub fn event_type_or(payload: &Value, default: &str) -> String {
    first_string(payload, &[plain_event_type, plain_type])
        .unwrap_or_else(|| default.to_string())
}

/// Customer email, normalized (trimmed, lower-cased). None when no candidate
/// path yields a non-empty string.
pub fn customer_email(payload: &Value) -> Option<String> {
    first_string(
        envelope(payload),
        &[nested_customer_email, flat_customer_email, nested_user_email],
    )
    .map(|e| e.trim().to_lowercase())
    .filter(|e| !e.is_empty())
}

/// Price identifier of the first line item.
pub fn price_id(payload: &Value) -> Option<String> {
    first_string(
        envelope(payload),
        &[first_item_price_id, first_item_flat_price_id],
    )
}

/// Paddle transaction identifier.
pub fn transaction_id(payload: &Value) -> Option<String> {
    first_string(envelope(payload), &[plain_id, flat_transaction_id])
}

/// Transaction status, case-folded. Defaults to "pending" when absent;
/// the status is also sought at the payload root, not just the envelope.
pub fn status(payload: &Value) -> String {
    first_string(envelope(payload), &[plain_status])
        .or_else(|| first_string(payload, &[plain_status]))
        .unwrap_or_else(|| "pending".to_string())
        .to_lowercase()
}

/// Statuses that gate license provisioning.
pub const SUCCESS_STATUSES: &[&str] = &["completed", "paid", "billed", "active"];

/// True for the success-like statuses (input must already be lower-cased,
/// which [`status`] guarantees).
pub fn is_success_status(status: &str) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// The licensed product variant, derived from the price identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Nt,
    Tv,
    Dual,
    Unknown,
}

impl Platform {
    /// Substring heuristic over the raw price id, first match wins in order
    /// nt, tv, dual. Anything else (or no price id) is Unknown.
    ///
    /// Known limitation: this is not an exact mapping - any price id that
    /// happens to contain a token matches it (e.g. "monthly" contains "nt").
    pub fn from_price_id(price_id: Option<&str>) -> Self {
        match price_id {
            Some(p) if p.contains("nt") => Platform::Nt,
            Some(p) if p.contains("tv") => Platform::Tv,
            Some(p) if p.contains("dual") => Platform::Dual,
            _ => Platform::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Platform::Unknown
    }
}
