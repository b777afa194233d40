use serde::{Deserialize, Serialize};

/// A Paddle transaction, upserted keyed on the provider's transaction id.
///
/// On conflict, status/product_label/price_id are overwritten with whatever
/// the latest delivery carried. Webhook deliveries are not ordered, so a
/// late-arriving older event can win - known limitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub paddle_transaction_id: String,
    pub product_label: String,
    pub price_id: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct UpsertSubscription<'a> {
    pub customer_id: &'a str,
    pub paddle_transaction_id: &'a str,
    pub product_label: &'a str,
    pub price_id: Option<&'a str>,
    pub status: &'a str,
}
