use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";
const DEFAULT_PORT: u16 = 3001;

pub struct Config {
    pub database_url: String,
    /// Payment provider API key.
    pub stripe_secret_key: String,
    /// Shared secret for webhook signature verification.
    pub stripe_webhook_secret: String,
    /// Frontend origin used to build success/cancel redirect URLs.
    pub app_base_url: String,
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics when a required variable is absent; the process cannot run
    /// without its datastore and provider credentials.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .expect("STRIPE_SECRET_KEY must be set"),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .expect("STRIPE_WEBHOOK_SECRET must be set"),
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_APP_BASE_URL.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}
