//! Application state for API handlers

use crate::config::StorageConfig;
use shinsa::{StoreHandle, TaskEngine, TemplateStore};

/// Which storage settings were supplied, as reported by the diagnostic endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageEnv {
    pub database_url_set: bool,
    pub database_name_set: bool,
}

impl From<&StorageConfig> for StorageEnv {
    fn from(config: &StorageConfig) -> Self {
        Self {
            database_url_set: config.url.is_some(),
            database_name_set: config.database.is_some(),
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Template store
    pub templates: TemplateStore,

    /// Task workflow engine
    pub tasks: TaskEngine,

    /// Storage handle, kept for diagnostics
    pub store: StoreHandle,

    /// Storage settings summary
    pub storage_env: StorageEnv,
}

impl AppState {
    /// Create new application state around a store handle
    pub fn new(store: StoreHandle, storage_env: StorageEnv) -> Self {
        Self {
            templates: TemplateStore::new(store.clone()),
            tasks: TaskEngine::new(store.clone()),
            store,
            storage_env,
        }
    }

    /// Create application state from storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.store_handle(), StorageEnv::from(config))
    }
}
