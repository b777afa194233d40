use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub events_database_path: String,
    pub base_url: String,
    /// Shared secret for the internal /api/license-notify endpoint
    pub notify_token: Option<String>,
    pub kit_api_key: Option<String>,
    pub kit_form_id: Option<String>,
    pub kit_base_url: String,
    /// Days to keep rows in the events table (0 = keep forever)
    pub events_retention_days: i64,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PADDLEKIT_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "paddlekit.db".to_string()),
            events_database_path: env::var("EVENTS_DATABASE_PATH")
                .unwrap_or_else(|_| "paddlekit_events.db".to_string()),
            base_url,
            notify_token: env::var("LICENSE_NOTIFY_TOKEN").ok(),
            kit_api_key: env::var("KIT_API_KEY").ok(),
            kit_form_id: env::var("KIT_FORM_ID").ok(),
            kit_base_url: env::var("KIT_BASE_URL")
                .unwrap_or_else(|_| "https://api.convertkit.com".to_string()),
            events_retention_days: env::var("EVENTS_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
