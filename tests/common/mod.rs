//! Test utilities and fixtures for Paddlekit integration tests

#![allow(dead_code)]

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use paddlekit::audit::AuditSink;
pub use paddlekit::db::{init_db, init_events_db, queries, AppState, DbPool};
pub use paddlekit::kit::KitClient;
pub use paddlekit::models::*;

pub const TEST_NOTIFY_TOKEN: &str = "test-notify-token";
pub const TEST_KIT_FORM_ID: &str = "12345";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an in-memory test events database with schema initialized
pub fn setup_test_events_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory events database");
    init_events_db(&conn).expect("Failed to initialize events schema");
    conn
}

/// Build a single-connection in-memory pool.
///
/// max_size 1 so every checkout sees the same in-memory database - separate
/// connections to :memory: are separate databases.
fn memory_pool(init: fn(&Connection) -> rusqlite::Result<()>) -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init(&conn).unwrap();
    }
    pool
}

/// Create an AppState for testing with in-memory databases.
///
/// The passed URL points at a mock server and is used for both `base_url`
/// (the nested notify endpoint, which the webhook tests stand in for
/// directly) and the Kit client. [`spawn_app`] overrides `base_url` to a
/// real listener for tests that exercise the full nested loop.
pub fn create_test_app_state(kit_base_url: &str) -> AppState {
    AppState {
        db: memory_pool(init_db),
        audit: AuditSink::new(memory_pool(init_events_db)),
        http: reqwest::Client::new(),
        base_url: kit_base_url.to_string(),
        notify_token: TEST_NOTIFY_TOKEN.to_string(),
        kit: KitClient::new("kit_test_key".to_string(), TEST_KIT_FORM_ID.to_string())
            .with_base_url(kit_base_url),
    }
}

/// Create a Router with all endpoints
pub fn app(state: AppState) -> Router {
    paddlekit::handlers::router().with_state(state)
}

/// Bind the full app on an ephemeral port and serve it in the background.
///
/// The returned state's `base_url` points back at the listener, so the
/// ingestor's nested notify call loops through the real HTTP stack.
pub async fn spawn_app(kit_base_url: &str) -> (AppState, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let mut state = create_test_app_state(kit_base_url);
    state.base_url = base_url.clone();

    let server = app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, server).await.unwrap();
    });

    (state, base_url)
}

/// Count rows in a table of the main database
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
