use crate::*;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crate::error::ApiError;
use cascade_core::{CascadeConfig, CascadeError};
use cascade_router::EchoBackend;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn state_with_ceiling(ceiling: f64) -> AppState {
    let mut config = CascadeConfig::default();
    config.budget.ceiling = ceiling;
    AppState::new(config, Arc::new(EchoBackend)).unwrap()
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app_with_state(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn new_session(state: &AppState) -> String {
    let req = Request::builder().method("POST").uri("/api/v1/sessions").body(Body::empty()).unwrap();
    let (status, body) = send(state, req).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let state = AppState::with_defaults().unwrap();
    let (status, body) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn test_app_builds_with_defaults() {
    let resp = app().unwrap().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ========== Sessions ==========

#[tokio::test]
async fn test_create_and_list_sessions() {
    let state = AppState::with_defaults().unwrap();
    let a = new_session(&state).await;
    let b = new_session(&state).await;
    assert_ne!(a, b);

    let (status, body) = send(&state, get("/api/v1/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 2);
    assert_eq!(body["sessions"][0]["classifier"], "keyword");
}

#[tokio::test]
async fn test_get_session() {
    let state = AppState::with_defaults().unwrap();
    let id = new_session(&state).await;
    let (status, body) = send(&state, get(&format!("/api/v1/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["id"], id.as_str());
    assert_eq!(body["ledger"]["spent"], 0.0);
}

#[tokio::test]
async fn test_delete_session() {
    let state = AppState::with_defaults().unwrap();
    let id = new_session(&state).await;
    let uri = format!("/api/v1/sessions/{}", id);

    let req = Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_unknown_session() {
    let state = AppState::with_defaults().unwrap();
    let (status, _) = send(&state, post_json("/api/v1/sessions/nope/route", json!({ "text": "hi" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&state, get("/api/v1/sessions/nope/report")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let mut config = CascadeConfig::default();
    config.server.max_sessions = 2;
    let state = AppState::new(config, Arc::new(EchoBackend)).unwrap();
    let first = new_session(&state).await;
    new_session(&state).await;

    let req = Request::builder().method("POST").uri("/api/v1/sessions").body(Body::empty()).unwrap();
    let (status, body) = send(&state, req).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "session_limit");
    assert_eq!(state.sessions.count(), 2);

    let req = Request::builder().method("DELETE").uri(format!("/api/v1/sessions/{}", first)).body(Body::empty()).unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    new_session(&state).await;
    assert_eq!(state.sessions.count(), 2);
}

#[test]
fn test_session_limit_error_mapping() {
    let err = ApiError::from(CascadeError::SessionLimit(3));
    assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
    let err = ApiError::from(CascadeError::InvalidCeiling(-1.0));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code, "internal_error");
}

// ========== Routing ==========

#[tokio::test]
async fn test_route_success() {
    let state = AppState::with_defaults().unwrap();
    let id = new_session(&state).await;
    let (status, body) = send(
        &state,
        post_json(&format!("/api/v1/sessions/{}/route", id), json!({ "text": "What is Python?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "success");
    assert_eq!(body["tier"], "simple");
    assert_eq!(body["backend"], "flash");
    assert_eq!(body["output"], "[flash] What is Python?");
}

#[tokio::test]
async fn test_route_empty_text() {
    let state = AppState::with_defaults().unwrap();
    let id = new_session(&state).await;
    let (status, body) = send(&state, post_json(&format!("/api/v1/sessions/{}/route", id), json!({ "text": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_route_trips_breaker() {
    let state = state_with_ceiling(0.2);
    let id = new_session(&state).await;
    let uri = format!("/api/v1/sessions/{}/route", id);

    let (status, _) = send(&state, post_json(&uri, json!({ "text": "Explain borrowing" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&state, post_json(&uri, json!({ "text": "Explain lifetimes" }))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["kind"], "admission_rejected");
    assert_eq!(body["reason"], "budget_exceeded");

    let (status, body) = send(&state, post_json(&uri, json!({ "text": "What is Rust?" }))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["reason"], "already_tripped");
    assert_eq!(body["ledger"]["state"], "tripped");
}

#[tokio::test]
async fn test_sessions_have_independent_budgets() {
    let state = state_with_ceiling(0.2);
    let a = new_session(&state).await;
    let b = new_session(&state).await;

    send(&state, post_json(&format!("/api/v1/sessions/{}/route", a), json!({ "text": "Explain" }))).await;
    send(&state, post_json(&format!("/api/v1/sessions/{}/route", a), json!({ "text": "Explain" }))).await;

    let (status, body) = send(&state, post_json(&format!("/api/v1/sessions/{}/route", b), json!({ "text": "Explain" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "success");
}

// ========== Status / Report ==========

#[tokio::test]
async fn test_status_and_report() {
    let state = AppState::with_defaults().unwrap();
    let id = new_session(&state).await;
    let uri = format!("/api/v1/sessions/{}/route", id);
    send(&state, post_json(&uri, json!({ "text": "Who is Ada Lovelace?" }))).await;
    send(&state, post_json(&uri, json!({ "text": "Analyze this design" }))).await;

    let (status, body) = send(&state, get(&format!("/api/v1/sessions/{}/status", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "active");
    assert!((body["spent"].as_f64().unwrap() - 0.151).abs() < 1e-9);

    let (status, body) = send(&state, get(&format!("/api/v1/sessions/{}/report", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests_routed"], 2);
    assert!((body["estimated_baseline_cost"].as_f64().unwrap() - 0.3).abs() < 1e-9);
    assert_eq!(body["per_tier_counts"][0]["count"], 1);
    assert_eq!(body["per_tier_counts"][2]["count"], 1);
}

#[tokio::test]
async fn test_invalid_config_rejected_at_startup() {
    let mut config = CascadeConfig::default();
    config.tiers.pop();
    assert!(AppState::new(config, Arc::new(EchoBackend)).is_err());
}
