//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const CUSTOMER_COLS: &str = "id, email, created_at";

pub const SUBSCRIPTION_COLS: &str =
    "id, customer_id, paddle_transaction_id, product_label, price_id, status, created_at, updated_at";

pub const LICENSE_COLS: &str =
    "id, customer_id, platform, license_key, status, notified, notified_at, created_at";

pub const EVENT_COLS: &str = "id, type, body, created_at";

// ============ FromRow Implementations ============

impl FromRow for Customer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get(0)?,
            email: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl FromRow for Subscription {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Subscription {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            paddle_transaction_id: row.get(2)?,
            product_label: row.get(3)?,
            price_id: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            platform: row.get(2)?,
            license_key: row.get(3)?,
            status: row.get(4)?,
            notified: row.get::<_, i64>(5)? != 0,
            notified_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl FromRow for AuditEvent {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AuditEvent {
            id: row.get(0)?,
            event_type: row.get(1)?,
            body: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}
