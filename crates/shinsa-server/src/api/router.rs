//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Templates
        .route(
            "/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route("/templates/seed", post(handlers::seed_template))
        .route("/templates/:id", get(handlers::get_template))
        // Tasks
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/tasks/:id", get(handlers::get_task))
        .route(
            "/tasks/:id/steps/:index/submit",
            post(handlers::submit_step_form),
        )
        .route(
            "/tasks/:id/steps/:index/decision",
            post(handlers::decide_step),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/test", get(handlers::diagnostics))
        .route("/schema", get(handlers::schema))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
