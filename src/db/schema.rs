use rusqlite::Connection;

/// Initialize the main database schema (everything except the event log)
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Customers (keyed by email - created on first sighting, never mutated)
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );

        -- Subscriptions (one row per Paddle transaction, last write wins)
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
            paddle_transaction_id TEXT NOT NULL UNIQUE,
            product_label TEXT NOT NULL,
            price_id TEXT,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_subscriptions_customer ON subscriptions(customer_id);

        -- Licenses (at most one per customer/platform pair)
        -- The UNIQUE constraint makes provisioning an atomic
        -- insert-or-return-existing instead of a racy read-then-write.
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
            platform TEXT NOT NULL,
            license_key TEXT NOT NULL,
            status TEXT NOT NULL,
            notified INTEGER NOT NULL DEFAULT 0,
            notified_at INTEGER,
            created_at INTEGER NOT NULL,
            UNIQUE(customer_id, platform)
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_unnotified ON licenses(customer_id) WHERE notified = 0;
        "#,
    )?;
    Ok(())
}

/// Initialize the events database schema (separate DB file)
/// Optimized for append-only workload with WAL mode
pub fn init_events_db(conn: &Connection) -> rusqlite::Result<()> {
    // WAL mode: writes are sequential appends, much faster for append-only workloads
    // synchronous=NORMAL: safe with WAL, faster than FULL
    // journal_size_limit: prevent WAL from growing indefinitely
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 1000;
        PRAGMA journal_size_limit = 67108864;

        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_events_type ON events(type);
        CREATE INDEX IF NOT EXISTS idx_events_time ON events(created_at);
        "#,
    )?;
    Ok(())
}
