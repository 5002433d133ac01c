//! Dispatch contract for the services that actually answer a request.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Opaque failure reported by a backend, passed through to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("backend {backend} failed: {message}")]
pub struct BackendFailure {
    pub backend: String,
    pub message: String,
}

impl BackendFailure {
    pub fn new(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self { backend: backend.into(), message: message.into() }
    }
}

/// A text-generation service reachable by backend id.
///
/// Timeouts, retries and cancellation belong to the implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn invoke(&self, backend_id: &str, request_text: &str) -> Result<String, BackendFailure>;
}

/// Offline backend that answers with the request text, tagged by backend id.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBackend;

#[async_trait]
impl Backend for EchoBackend {
    async fn invoke(&self, backend_id: &str, request_text: &str) -> Result<String, BackendFailure> {
        Ok(format!("[{}] {}", backend_id, request_text))
    }
}
