use serde::{Deserialize, Serialize};

/// An append-only audit record of an inbound webhook or internal milestone.
///
/// Write-only from this system's point of view - exists purely for
/// debugging. `body` is the raw JSON the event was recorded with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub body: String,
    pub created_at: i64,
}
