//! Template handlers

use crate::api::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Json,
};
use shinsa::{DocumentId, Stored, TaskTemplate};

/// Ensure the default template exists and return it
pub async fn seed_template(State(state): State<AppState>) -> ApiResult<Json<Stored<TaskTemplate>>> {
    let template = state.templates.seed().await?;
    Ok(Json(template))
}

/// Create a new template
pub async fn create_template(
    State(state): State<AppState>,
    Json(template): Json<TaskTemplate>,
) -> ApiResult<Json<Stored<TaskTemplate>>> {
    let template = state.templates.create(template).await?;
    Ok(Json(template))
}

/// List all templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Stored<TaskTemplate>>>> {
    let templates = state.templates.list().await?;
    Ok(Json(templates))
}

/// Get a specific template
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Stored<TaskTemplate>>> {
    let template = state.templates.get(&DocumentId::new(id)).await?;
    Ok(Json(template))
}
