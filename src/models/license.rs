use serde::{Deserialize, Serialize};

/// A provisioned license for one (customer, platform) pair.
///
/// Status is fixed at "active" on creation. `notified`/`notified_at` are the
/// only fields that change afterwards: they flip 0 -> 1 once the license
/// delivery call has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub customer_id: String,
    pub platform: String,
    pub license_key: String,
    pub status: String,
    pub notified: bool,
    pub notified_at: Option<i64>,
    pub created_at: i64,
}
