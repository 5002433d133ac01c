//! Application state shared across all handlers.

use cascade_core::{CascadeConfig, CascadeError, Result};
use cascade_router::{Backend, EchoBackend, Router, TierRegistry};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One routing session: a router with its own ledger and counters.
pub struct RoutingSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub router: Router,
}

/// Public description of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub classifier: &'static str,
}

impl RoutingSession {
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            created_at: self.created_at,
            classifier: self.router.classifier_name(),
        }
    }
}

/// Creates and tracks sessions. Every session shares the tier table and backend.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<CascadeConfig>,
    registry: Arc<TierRegistry>,
    backend: Arc<dyn Backend>,
    sessions: Arc<RwLock<HashMap<String, Arc<RoutingSession>>>>,
}

impl SessionManager {
    pub fn new(config: CascadeConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(TierRegistry::from_config(&config)?);
        Ok(Self {
            config: Arc::new(config),
            registry,
            backend,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Start a fresh session with a zeroed ledger.
    ///
    /// Fails with [`CascadeError::SessionLimit`] once `server.max_sessions`
    /// sessions are open; deleting one frees its slot.
    pub fn create(&self) -> Result<Arc<RoutingSession>> {
        let router = Router::with_registry(&self.config, self.registry.clone(), self.backend.clone())?;
        let session = Arc::new(RoutingSession {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            router,
        });

        let max = self.config.server.max_sessions;
        let open = {
            let mut sessions = self.sessions.write();
            if sessions.len() >= max {
                tracing::warn!(open = sessions.len(), max, "session limit reached");
                return Err(CascadeError::SessionLimit(sessions.len()));
            }
            sessions.insert(session.id.clone(), session.clone());
            sessions.len()
        };
        tracing::info!(session = %session.id, open, ceiling = self.config.budget.ceiling, "session created");
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<RoutingSession>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<RoutingSession>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            tracing::info!(session = %id, "session closed");
        }
        removed
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<_> = self.sessions.read().values().map(|s| s.info()).collect();
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        infos
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: CascadeConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        Ok(Self {
            sessions: SessionManager::new(config, backend)?,
            start_time: std::time::Instant::now(),
        })
    }

    /// Default configuration, answering through [`EchoBackend`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(CascadeConfig::default(), Arc::new(EchoBackend))
    }
}
