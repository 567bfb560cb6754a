use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shinsa::{Backend, InMemoryStore, StoreHandle};
use shinsa_server::api::{create_router, AppState, StorageEnv};
use tower::ServiceExt;

fn test_router() -> Router {
    let store = StoreHandle::new(Backend::available(InMemoryStore::new()));
    create_router(AppState::new(
        store,
        StorageEnv {
            database_url_set: true,
            database_name_set: false,
        },
    ))
}

fn unavailable_router() -> Router {
    let store = StoreHandle::new(Backend::unavailable("Database not configured"));
    create_router(AppState::new(store, StorageEnv::default()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).expect("serialize body")))
            .expect("build request"),
        None => request.body(Body::empty()).expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn seeded_task(app: &Router) -> String {
    let (_, template) = call(app, "POST", "/api/templates/seed", None).await;
    let template_id = template["id"].as_str().expect("template id").to_string();
    let (status, task) = call(
        app,
        "POST",
        "/api/tasks",
        Some(json!({ "template_id": template_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    task["id"].as_str().expect("task id").to_string()
}

#[tokio::test]
async fn test_root_reports_liveness() {
    let app = test_router();
    let (status, body) = call(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task Approval Backend Running");
}

#[tokio::test]
async fn test_schema_lists_collections() {
    let app = test_router();
    let (status, body) = call(&app, "GET", "/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "collections": ["tasktemplate", "taskinstance"] }));
}

#[tokio::test]
async fn test_diagnostics_report_storage_state() {
    let app = test_router();
    call(&app, "POST", "/api/templates/seed", None).await;

    let (status, body) = call(&app, "GET", "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connection_status"], "Connected");
    assert_eq!(body["database_url"], "✅ Set");
    assert_eq!(body["database_name"], "❌ Not Set");
    assert_eq!(body["collections"], json!(["tasktemplate"]));

    let app = unavailable_router();
    let (status, body) = call(&app, "GET", "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connection_status"], "Not Connected");
    assert_eq!(body["database"], "❌ Not Available");
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let app = test_router();
    let (status, first) = call(&app, "POST", "/api/templates/seed", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = call(&app, "POST", "/api/templates/seed", None).await;

    assert_eq!(first, second);
    assert_eq!(first["title"], "General Request Approval");
    assert_eq!(first["steps"].as_array().expect("steps").len(), 3);
    assert!(first.get("_id").is_none());
}

#[tokio::test]
async fn test_create_and_fetch_template() {
    let app = test_router();
    let template = json!({
        "id": "client-chosen",
        "title": "Vacation",
        "steps": [
            { "name": "Request", "fields": [{ "key": "days", "label": "Days", "type": "number", "required": true }] },
            { "name": "Approval" }
        ]
    });

    let (status, created) = call(&app, "POST", "/api/templates", Some(template)).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().expect("template id").to_string();
    assert_ne!(id, "client-chosen");

    let (status, fetched) = call(&app, "GET", &format!("/api/templates/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Vacation");

    let (status, list) = call(&app, "GET", "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().expect("template list").len(), 1);

    let (status, body) = call(
        &app,
        "POST",
        "/api/templates",
        Some(json!({ "title": "Empty", "steps": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().expect("detail").contains("at least one step"));

    let (status, _) = call(&app, "GET", "/api/templates/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_task_with_unknown_template_is_404() {
    let app = test_router();
    let (status, body) = call(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "template_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Template not found");
}

#[tokio::test]
async fn test_get_unknown_task_is_404() {
    let app = test_router();
    let (status, body) = call(&app, "GET", "/api/tasks/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");

    let (status, _) = call(
        &app,
        "POST",
        "/api/tasks/missing/steps/0/decision",
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_index_and_action_are_400() {
    let app = test_router();
    let task_id = seeded_task(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/3/submit", task_id),
        Some(json!({ "data": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid step index");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/-1/decision", task_id),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/0/decision", task_id),
        Some(json!({ "action": "escalate" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid action");
}

#[tokio::test]
async fn test_non_numeric_index_is_json_400() {
    let app = test_router();
    let task_id = seeded_task(&app).await;

    for index in ["abc", "99999999999999999999"] {
        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/tasks/{}/steps/{}/decision", task_id, index),
            Some(json!({ "action": "approve" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid step index");
    }

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/x/submit", task_id),
        Some(json!({ "data": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid step index");
}

#[tokio::test]
async fn test_decision_on_rejected_task_is_400() {
    let app = test_router();
    let task_id = seeded_task(&app).await;

    let (status, task) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/0/decision", task_id),
        Some(json!({ "action": "reject" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["current_step_index"], 0);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/2/decision", task_id),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Task is already rejected");

    let (_, task) = call(&app, "GET", &format!("/api/tasks/{}", task_id), None).await;
    assert_eq!(task["status"], "rejected");
    assert_eq!(task["steps"][2]["status"], "pending");
}

#[tokio::test]
async fn test_approval_flow_end_to_end() {
    let app = test_router();
    let task_id = seeded_task(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/0/submit", task_id),
        Some(json!({ "data": { "subject": "X", "amount": 100 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, task) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/0/decision", task_id),
        Some(json!({ "action": "approve", "actor": "manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "in_progress");
    assert_eq!(task["current_step_index"], 1);
    assert_eq!(task["steps"][0]["form_data"], json!({ "subject": "X", "amount": 100 }));

    let (status, task) = call(
        &app,
        "POST",
        &format!("/api/tasks/{}/steps/1/decision", task_id),
        Some(json!({ "action": "Reject", "comment": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "rejected");
    assert_eq!(task["steps"][1]["status"], "rejected");
    assert_eq!(task["steps"][1]["comment"], "no");
    assert_eq!(task["current_step_index"], 1);
    assert_eq!(task["id"], task_id.as_str());

    let (status, rejected) = call(&app, "GET", "/api/tasks?status=rejected", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected.as_array().expect("task list").len(), 1);

    let (_, submitted) = call(&app, "GET", "/api/tasks?status=submitted", None).await;
    assert!(submitted.as_array().expect("task list").is_empty());

    let (_, all) = call(&app, "GET", "/api/tasks?status=", None).await;
    assert_eq!(all.as_array().expect("task list").len(), 1);

    let (status, _) = call(&app, "GET", "/api/tasks?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_storage_is_500() {
    let app = unavailable_router();

    let (status, body) = call(&app, "POST", "/api/templates/seed", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Database not configured");

    let (status, _) = call(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // liveness does not touch storage
    let (status, _) = call(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
}
