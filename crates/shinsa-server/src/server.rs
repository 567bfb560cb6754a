//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::ServiceConfig;
use crate::error::ServerError;
use shinsa::Backend;
use tokio::net::TcpListener;

/// Task approval HTTP server
pub struct Server {
    config: ServiceConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::from_config(&config.storage);
        Self { config, state }
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.server.listen_addr;

        match self.state.store.backend() {
            Backend::Available(_) => tracing::info!(
                database = self.config.storage.database.as_deref().unwrap_or("-"),
                "Storage connected"
            ),
            Backend::Unavailable(reason) => {
                tracing::warn!("Storage unavailable: {}; data endpoints will fail", reason)
            }
        }

        let app = create_router(self.state);
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Task approval backend listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Task approval backend shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
