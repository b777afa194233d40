use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paddlekit::audit::AuditSink;
use paddlekit::config::Config;
use paddlekit::db::{create_pool, init_db, init_events_db, queries, AppState};
use paddlekit::handlers;
use paddlekit::kit::KitClient;

#[derive(Parser, Debug)]
#[command(name = "paddlekit")]
#[command(about = "Paddle webhook ingestion and license delivery via Kit")]
struct Cli {
    /// Delete databases on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paddlekit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let notify_token = config
        .notify_token
        .clone()
        .filter(|t| !t.is_empty())
        .expect("LICENSE_NOTIFY_TOKEN must be set and non-empty");
    let kit_api_key = config.kit_api_key.clone().expect("KIT_API_KEY must be set");
    let kit_form_id = config.kit_form_id.clone().expect("KIT_FORM_ID must be set");

    // Create database connection pools
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    let events_pool =
        create_pool(&config.events_database_path).expect("Failed to create events database pool");

    // Initialize database schemas
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }
    {
        let conn = events_pool.get().expect("Failed to get events connection");
        init_events_db(&conn).expect("Failed to initialize events database");
    }

    let state = AppState {
        db: db_pool,
        audit: AuditSink::new(events_pool),
        http: reqwest::Client::new(),
        base_url: config.base_url.clone(),
        notify_token,
        kit: KitClient::new(kit_api_key, kit_form_id).with_base_url(config.kit_base_url.clone()),
    };

    // Purge old events on startup (0 = never purge)
    if config.events_retention_days > 0 {
        let conn = state
            .audit
            .pool()
            .get()
            .expect("Failed to get events connection for purge");
        match queries::purge_old_events(&conn, config.events_retention_days) {
            Ok(count) if count > 0 => {
                tracing::info!(
                    "Purged {} events older than {} days",
                    count,
                    config.events_retention_days
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to purge old events: {}", e);
            }
        }
    }

    // Build the application router
    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral ignored: not in dev mode (set PADDLEKIT_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: databases will be deleted on exit");
    }

    tracing::info!("Paddlekit server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        cleanup_databases(&config.database_path, &config.events_database_path);
    }
}

fn cleanup_databases(db_path: &str, events_path: &str) {
    tracing::info!("Cleaning up ephemeral databases...");
    for path in [db_path, events_path] {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove {}: {}", path, e);
        } else {
            tracing::info!("Removed {}", path);
        }
        // Also remove WAL and SHM files if they exist
        let _ = std::fs::remove_file(format!("{}-wal", path));
        let _ = std::fs::remove_file(format!("{}-shm", path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
