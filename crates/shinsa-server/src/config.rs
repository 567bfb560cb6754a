//! Configuration for shinsa-server

use serde::{Deserialize, Serialize};
use shinsa::{Backend, InMemoryStore, StoreHandle};
use std::net::SocketAddr;
use std::time::Duration;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage endpoint. `memory://` selects the in-memory store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Database name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Upper bound on a single storage call, in seconds
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            database: None,
            timeout_secs: default_storage_timeout(),
        }
    }
}

impl StorageConfig {
    /// Picks the backend named by `url`.
    ///
    /// Never fails: a missing or unsupported URL yields
    /// [`Backend::Unavailable`] so the service can still start.
    pub fn backend(&self) -> Backend {
        match self.url.as_deref().map(str::trim) {
            None | Some("") => Backend::unavailable("Database not configured"),
            Some(url) if url == "memory" || url.starts_with("memory://") => {
                Backend::available(InMemoryStore::new())
            }
            Some(url) => {
                let scheme = url.split("://").next().unwrap_or(url);
                Backend::unavailable(format!("Unsupported storage scheme: {}", scheme))
            }
        }
    }

    /// Builds a store handle for the configured backend and timeout.
    pub fn store_handle(&self) -> StoreHandle {
        StoreHandle::new(self.backend()).with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_storage_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load configuration from defaults, an optional file and `SHINSA__*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // e.g. SHINSA__STORAGE__URL=memory://
        builder = builder.add_source(
            config::Environment::with_prefix("SHINSA")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
