use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{
    query_all, query_one, CUSTOMER_COLS, EVENT_COLS, LICENSE_COLS, SUBSCRIPTION_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Customers ============

/// Insert a customer by email if one does not exist yet.
///
/// Existing rows are left untouched; the caller re-reads the surrogate id
/// with [`get_customer_by_email`] afterwards.
pub fn upsert_customer(conn: &Connection, email: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO customers (id, email, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(email) DO NOTHING",
        params![gen_id(), email, now()],
    )?;
    Ok(())
}

pub fn get_customer_by_email(conn: &Connection, email: &str) -> Result<Option<Customer>> {
    query_one(
        conn,
        &format!("SELECT {} FROM customers WHERE email = ?1", CUSTOMER_COLS),
        &[&email],
    )
}

// ============ Subscriptions ============

/// Upsert a subscription keyed on the Paddle transaction id.
///
/// On conflict, status/product_label/price_id are overwritten with the
/// incoming values unconditionally - last write wins, with no ordering
/// guarantee against out-of-order webhook delivery.
pub fn upsert_subscription(conn: &Connection, input: &UpsertSubscription) -> Result<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO subscriptions (id, customer_id, paddle_transaction_id, product_label, price_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT(paddle_transaction_id) DO UPDATE SET
           status = excluded.status,
           product_label = excluded.product_label,
           price_id = excluded.price_id,
           updated_at = excluded.updated_at",
        params![
            gen_id(),
            input.customer_id,
            input.paddle_transaction_id,
            input.product_label,
            input.price_id,
            input.status,
            ts
        ],
    )?;
    Ok(())
}

pub fn get_subscription_by_transaction(
    conn: &Connection,
    paddle_transaction_id: &str,
) -> Result<Option<Subscription>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM subscriptions WHERE paddle_transaction_id = ?1",
            SUBSCRIPTION_COLS
        ),
        &[&paddle_transaction_id],
    )
}

// ============ Licenses ============

/// Outcome of an atomic license provisioning attempt.
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// A fresh license row was inserted with the supplied key.
    Created(License),
    /// A license already existed for this (customer, platform) pair.
    Existing(License),
}

/// Atomically provision a license for (customer, platform).
///
/// The UNIQUE(customer_id, platform) constraint plus ON CONFLICT DO NOTHING
/// makes this an insert-or-return-existing: two concurrent deliveries of the
/// same purchase cannot both insert. The supplied key is discarded when the
/// row already exists.
pub fn provision_license(
    conn: &Connection,
    customer_id: &str,
    platform: &str,
    license_key: &str,
) -> Result<ProvisionOutcome> {
    let id = gen_id();
    let ts = now();

    let inserted = conn.execute(
        "INSERT INTO licenses (id, customer_id, platform, license_key, status, notified, created_at)
         VALUES (?1, ?2, ?3, ?4, 'active', 0, ?5)
         ON CONFLICT(customer_id, platform) DO NOTHING",
        params![&id, customer_id, platform, license_key, ts],
    )?;

    if inserted > 0 {
        return Ok(ProvisionOutcome::Created(License {
            id,
            customer_id: customer_id.to_string(),
            platform: platform.to_string(),
            license_key: license_key.to_string(),
            status: "active".to_string(),
            notified: false,
            notified_at: None,
            created_at: ts,
        }));
    }

    match get_license(conn, customer_id, platform)? {
        Some(existing) => Ok(ProvisionOutcome::Existing(existing)),
        // Insert was a no-op but the row is gone - cannot happen without
        // someone deleting licenses out from under us.
        None => Err(AppError::Internal(format!(
            "license insert conflicted but no row found for customer {} platform {}",
            customer_id, platform
        ))),
    }
}

pub fn get_license(
    conn: &Connection,
    customer_id: &str,
    platform: &str,
) -> Result<Option<License>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM licenses WHERE customer_id = ?1 AND platform = ?2",
            LICENSE_COLS
        ),
        &[&customer_id, &platform],
    )
}

/// Flip `notified` to 1 after a successful delivery call.
///
/// Scoped to (customer_id, platform, license_key) so a stale key never
/// touches an unrelated row. Returns whether a row was updated.
pub fn mark_license_notified(
    conn: &Connection,
    customer_id: &str,
    platform: &str,
    license_key: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE licenses SET notified = 1, notified_at = ?1
         WHERE customer_id = ?2 AND platform = ?3 AND license_key = ?4",
        params![now(), customer_id, platform, license_key],
    )?;
    Ok(affected > 0)
}

// ============ Events ============

/// Append a record to the events table.
///
/// Callers wanting best-effort semantics go through
/// [`crate::audit::AuditSink`], which swallows errors from here.
pub fn record_event(conn: &Connection, event_type: &str, body: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO events (id, type, body, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![gen_id(), event_type, body, now()],
    )?;
    Ok(())
}

pub fn list_events_by_type(conn: &Connection, event_type: &str) -> Result<Vec<AuditEvent>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM events WHERE type = ?1 ORDER BY created_at",
            EVENT_COLS
        ),
        &[&event_type],
    )
}

/// Purge events older than the retention period.
/// Returns the number of deleted records.
pub fn purge_old_events(conn: &Connection, retention_days: i64) -> Result<usize> {
    let cutoff = now() - (retention_days * 86400);
    let deleted = conn.execute("DELETE FROM events WHERE created_at < ?1", params![cutoff])?;
    Ok(deleted)
}
