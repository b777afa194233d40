use serde::{Deserialize, Serialize};

/// A purchaser, keyed by email. Created on first sighting of an email in a
/// webhook; never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub created_at: i64,
}
