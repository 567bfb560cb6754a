//! HTTP/JSON surface for the shinsa approval workflow.
//!
//! - REST handlers for templates and tasks
//! - Configuration loading
//! - Logging setup and server lifecycle

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use api::{create_router, AppState};
pub use config::ServiceConfig;
pub use error::{ApiError, ServerError};
pub use server::Server;
