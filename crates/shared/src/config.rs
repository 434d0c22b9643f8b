//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Store-of-record (PostgreSQL) configuration.
    pub database: DatabaseConfig,
    /// Offline operation queue (local SQLite) configuration.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Sync reconciler configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Store-of-record configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Offline operation queue configuration.
///
/// The queue is a device-local SQLite database, kept separate from the store
/// of record so queued intents survive restarts while the store is down.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// SQLite connection URL for the queue.
    #[serde(default = "default_queue_url")]
    pub url: String,
}

fn default_queue_url() -> String {
    "sqlite://kasku_queue.db?mode=rwc".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: default_queue_url(),
        }
    }
}

/// Sync reconciler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between store-of-record connectivity probes.
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
    /// Whether the reconciler drains automatically when connectivity returns.
    #[serde(default = "default_auto_drain")]
    pub auto_drain: bool,
}

fn default_probe_interval() -> u64 {
    5
}

fn default_auto_drain() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval(),
            auto_drain: default_auto_drain(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KASKU").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
