//! Classification -> registry lookup -> admission -> dispatch.

use crate::backend::{Backend, BackendFailure};
use crate::classifier::{classifier_from_config, Classifier};
use crate::ledger::{BudgetLedger, ChargeOutcome, LedgerStatus, RejectReason};
use crate::registry::TierRegistry;
use crate::reporter::{SessionReport, SessionReporter};
use crate::stats::RoutingStats;
use cascade_core::{CascadeConfig, Result, Tier};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Text to classify and route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRequest {
    pub text: String,
}

impl RoutingRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for RoutingRequest {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RoutingRequest {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Outcome of one `route` call. Budget and backend failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingResult {
    Success {
        tier: Tier,
        backend: String,
        cost: f64,
        output: String,
        ledger: LedgerStatus,
    },
    AdmissionRejected {
        reason: RejectReason,
        tier: Tier,
        cost: f64,
        ledger: LedgerStatus,
    },
    /// The charge was applied and is not refunded.
    BackendError {
        tier: Tier,
        backend: String,
        cost: f64,
        error: BackendFailure,
        ledger: LedgerStatus,
    },
}

impl RoutingResult {
    /// Short status tag: `success`, `budget_exceeded`, `already_tripped` or `error`.
    pub fn status(&self) -> &'static str {
        match self {
            RoutingResult::Success { .. } => "success",
            RoutingResult::AdmissionRejected { reason, .. } => reason.as_str(),
            RoutingResult::BackendError { .. } => "error",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            RoutingResult::Success { tier, .. }
            | RoutingResult::AdmissionRejected { tier, .. }
            | RoutingResult::BackendError { tier, .. } => *tier,
        }
    }

    pub fn ledger(&self) -> &LedgerStatus {
        match self {
            RoutingResult::Success { ledger, .. }
            | RoutingResult::AdmissionRejected { ledger, .. }
            | RoutingResult::BackendError { ledger, .. } => ledger,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RoutingResult::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            RoutingResult::Success { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            RoutingResult::AdmissionRejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// One routing session: a classifier, a shared tier table, and the session's
/// own ledger and counters.
pub struct Router {
    classifier: Box<dyn Classifier>,
    registry: Arc<TierRegistry>,
    ledger: Arc<BudgetLedger>,
    stats: Mutex<RoutingStats>,
    backend: Arc<dyn Backend>,
}

impl Router {
    pub fn new(
        classifier: Box<dyn Classifier>,
        registry: Arc<TierRegistry>,
        ledger: Arc<BudgetLedger>,
        backend: Arc<dyn Backend>,
    ) -> Self {
        Self { classifier, registry, ledger, stats: Mutex::new(RoutingStats::new()), backend }
    }

    /// Build a fresh session from configuration.
    pub fn from_config(config: &CascadeConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        let registry = Arc::new(TierRegistry::from_config(config)?);
        Self::with_registry(config, registry, backend)
    }

    /// Build a fresh session that shares an existing tier table.
    pub fn with_registry(
        config: &CascadeConfig,
        registry: Arc<TierRegistry>,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        let classifier = classifier_from_config(&config.classifier)?;
        let ledger = Arc::new(BudgetLedger::from_config(&config.budget)?);
        Ok(Self::new(classifier, registry, ledger, backend))
    }

    pub fn classify(&self, text: &str) -> Tier {
        self.classifier.classify(text)
    }

    /// Route one request. Single shot: no retries, no queuing.
    pub async fn route(&self, request: RoutingRequest) -> RoutingResult {
        let tier = self.classifier.classify(&request.text);
        let entry = self.registry.entry(tier);
        let cost = entry.unit_cost;
        debug!(%tier, classifier = self.classifier.name(), backend = %entry.backend, cost, "classified request");

        if let ChargeOutcome::Rejected(reason) = self.ledger.try_charge(cost) {
            let ledger = self.ledger.get_status();
            warn!(%tier, cost, %reason, spent = ledger.spent, ceiling = ledger.ceiling, "request not admitted");
            return RoutingResult::AdmissionRejected { reason, tier, cost, ledger };
        }

        // Charge is final; the ledger lock is not held across dispatch.
        match self.backend.invoke(&entry.backend, &request.text).await {
            Ok(output) => {
                self.stats.lock().record(tier, cost);
                let ledger = self.ledger.get_status();
                info!(%tier, backend = %entry.backend, cost, spent = ledger.spent, "request routed");
                RoutingResult::Success { tier, backend: entry.backend.clone(), cost, output, ledger }
            }
            Err(error) => {
                let ledger = self.ledger.get_status();
                warn!(%tier, backend = %entry.backend, cost, error = %error, "backend failed, charge kept");
                RoutingResult::BackendError { tier, backend: entry.backend.clone(), cost, error, ledger }
            }
        }
    }

    pub fn ledger(&self) -> &Arc<BudgetLedger> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<TierRegistry> {
        &self.registry
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Snapshot of the session counters.
    pub fn stats(&self) -> RoutingStats {
        self.stats.lock().clone()
    }

    pub fn get_status(&self) -> LedgerStatus {
        self.ledger.get_status()
    }

    pub fn report(&self) -> SessionReport {
        SessionReporter::new(&self.ledger, &self.registry, self.stats()).report()
    }
}
