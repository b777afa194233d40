//! Best-effort event recording.

use crate::db::{queries, DbPool};

/// Append-only event recorder backed by the events database.
///
/// Contract: [`AuditSink::record`] never returns an error and never
/// interrupts the caller - pool exhaustion and write failures are traced at
/// `warn` and swallowed. The event log exists for debugging; it must not be
/// able to take down webhook processing.
#[derive(Clone)]
pub struct AuditSink {
    pool: DbPool,
}

impl AuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record an event under the given type label.
    pub fn record(&self, event_type: &str, body: &serde_json::Value) {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("events db connection failed, dropping '{}' event: {}", event_type, e);
                return;
            }
        };

        if let Err(e) = queries::record_event(&conn, event_type, &body.to_string()) {
            tracing::warn!("failed to record '{}' event: {}", event_type, e);
        }
    }

    /// The underlying pool, for schema init and retention purges.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
