//! Liveness, diagnostic and schema handlers

use crate::api::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shinsa::collection;

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness endpoint
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Task Approval Backend Running".to_string(),
    })
}

/// Storage diagnostic report
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn set_flag(set: bool) -> String {
    let flag = if set { "✅ Set" } else { "❌ Not Set" };
    flag.to_string()
}

fn truncated(message: &str) -> String {
    message.chars().take(50).collect()
}

/// Diagnostic endpoint
///
/// Storage failures are reported in the body, never as an error status.
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: set_flag(state.storage_env.database_url_set),
        database_name: set_flag(state.storage_env.database_name_set),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    if state.store.backend().is_available() {
        response.database = "✅ Connected & Working".to_string();
        response.connection_status = "Connected".to_string();
        match state.store.collection_names().await {
            Ok(names) => response.collections = names,
            Err(e) => {
                tracing::warn!("Listing collections failed: {}", e);
                response.database =
                    format!("⚠️ Connected but Error: {}", truncated(&e.to_string()));
            }
        }
    }

    Json(response)
}

/// Collection listing for tooling
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub collections: Vec<String>,
}

/// Schema endpoint
pub async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        collections: collection::ALL.iter().map(|c| c.to_string()).collect(),
    })
}
