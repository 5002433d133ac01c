use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cascade_router::{LedgerStatus, RoutingResult, SessionReport};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub text: String,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions", post(create_session).get(list_sessions))
        .route("/api/v1/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/v1/sessions/{id}/route", post(route_request))
        .route("/api/v1/sessions/{id}/status", get(session_status))
        .route("/api/v1/sessions/{id}/report", get(session_report))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn create_session(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let session = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(json!(session.info()))))
}

async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "sessions": state.sessions.list() }))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let session = state.sessions.get(&id).ok_or_else(|| no_session(&id))?;
    Ok(Json(json!({
        "session": session.info(),
        "ledger": session.router.get_status(),
    })))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).ok_or_else(|| no_session(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Budget rejections answer 402 and backend failures 502; the body is the
/// typed result either way.
async fn route_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RouteBody>,
) -> Result<(StatusCode, Json<RoutingResult>), ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }
    let session = state.sessions.get(&id).ok_or_else(|| no_session(&id))?;
    let result = session.router.route(body.text.into()).await;
    let status = match &result {
        RoutingResult::Success { .. } => StatusCode::OK,
        RoutingResult::AdmissionRejected { .. } => StatusCode::PAYMENT_REQUIRED,
        RoutingResult::BackendError { .. } => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(result)))
}

async fn session_status(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<LedgerStatus>, ApiError> {
    let session = state.sessions.get(&id).ok_or_else(|| no_session(&id))?;
    Ok(Json(session.router.get_status()))
}

async fn session_report(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SessionReport>, ApiError> {
    let session = state.sessions.get(&id).ok_or_else(|| no_session(&id))?;
    Ok(Json(session.router.report()))
}

fn no_session(id: &str) -> ApiError {
    ApiError::not_found(format!("Session not found: {}", id))
}
