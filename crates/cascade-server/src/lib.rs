//! Cascade HTTP API server (Axum).
//!
//! Hosts many independent routing sessions, each with its own budget ledger
//! and counters, over one shared tier table.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;

/// Build the application router with default configuration and the echo backend.
pub fn app() -> cascade_core::Result<Router> {
    Ok(app_with_state(AppState::with_defaults()?))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::session_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests;
