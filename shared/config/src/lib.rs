use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in the pool
    pub max_connections: Option<u32>,

    /// JWT secret key for validating bearer tokens
    pub jwt_secret: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// NATS server URL (optional - event publishing disabled when unset)
    pub nats_url: Option<String>,

    /// Redis URL (optional - location read cache disabled when unset)
    pub redis_url: Option<String>,

    /// Base URL of the product catalog service (optional - query enrichment
    /// degrades to nulls when unset)
    pub product_catalog_url: Option<String>,

    /// Timeout for external service calls in milliseconds
    #[serde(default = "default_external_timeout_ms")]
    pub external_timeout_ms: u64,

    /// Outbox worker poll interval in seconds
    #[serde(default = "default_outbox_poll_seconds")]
    pub outbox_poll_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_external_timeout_ms() -> u64 {
    2_000
}

fn default_outbox_poll_seconds() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .set_default("database_url", "")?
            .set_default("jwt_secret", "")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("external_timeout_ms", 2_000)?
            .set_default("outbox_poll_seconds", 5)?
            .add_source(config::Environment::default());

        builder.build()?.try_deserialize::<Config>()
    }
}
