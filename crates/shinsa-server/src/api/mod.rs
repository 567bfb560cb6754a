//! HTTP/JSON API

pub mod handlers;
mod router;
pub mod state;

pub use router::create_router;
pub use state::{AppState, StorageEnv};
