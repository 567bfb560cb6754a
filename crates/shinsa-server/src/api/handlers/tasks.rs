//! Task handlers

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shinsa::{DecisionRequest, DocumentId, FormData, NewTask, Stored, TaskInstance, TaskStatus};

/// Create a task from a template
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<NewTask>,
) -> ApiResult<Json<Stored<TaskInstance>>> {
    let task = state.tasks.create_task(request).await?;
    Ok(Json(task))
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
}

/// List tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Stored<TaskInstance>>>> {
    // an empty status means no filter
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<TaskStatus>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };

    let tasks = state.tasks.list_tasks(status).await?;
    Ok(Json(tasks))
}

/// Get a specific task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Stored<TaskInstance>>> {
    let task = state.tasks.get_task(&DocumentId::new(id)).await?;
    Ok(Json(task))
}

/// Parses the `:index` path segment; anything that is not an `i64` is reported
/// like an out-of-range index.
fn step_index(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid step index".to_string()))
}

/// Step form submission body
#[derive(Debug, Deserialize)]
pub struct SubmitStepFormRequest {
    pub data: FormData,
}

/// Step form submission response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitStepFormResponse {
    pub ok: bool,
}

/// Submit form data for one step
pub async fn submit_step_form(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
    Json(request): Json<SubmitStepFormRequest>,
) -> ApiResult<Json<SubmitStepFormResponse>> {
    let index = step_index(&index)?;
    state
        .tasks
        .submit_step_form(&DocumentId::new(id), index, request.data)
        .await?;
    Ok(Json(SubmitStepFormResponse { ok: true }))
}

/// Approve or reject one step
pub async fn decide_step(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<Stored<TaskInstance>>> {
    let index = step_index(&index)?;
    let task = state
        .tasks
        .decide_step(&DocumentId::new(id), index, request)
        .await?;
    Ok(Json(task))
}
