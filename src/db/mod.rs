mod schema;
pub mod from_row;
pub mod queries;

pub use schema::{init_db, init_events_db};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::audit::AuditSink;
use crate::kit::KitClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding database pools and configuration
#[derive(Clone)]
pub struct AppState {
    /// Main database pool (customers, subscriptions, licenses)
    pub db: DbPool,
    /// Best-effort event recorder (separate DB file to isolate growth)
    pub audit: AuditSink,
    /// Shared outbound HTTP client (notify call)
    pub http: reqwest::Client,
    /// Base URL the ingestor uses to reach its own notify endpoint
    pub base_url: String,
    /// Shared secret expected by /api/license-notify
    pub notify_token: String,
    /// Kit (ConvertKit) subscribe client
    pub kit: KitClient,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
