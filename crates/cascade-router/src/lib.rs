//! Cascade Router — complexity classification, tier registry, budget ledger
//! with a latching circuit breaker, and single-shot dispatch.

pub mod backend;
pub mod classifier;
pub mod ledger;
pub mod registry;
pub mod reporter;
pub mod router;
pub mod stats;

pub use backend::{Backend, BackendFailure, EchoBackend};
pub use classifier::{classifier_from_config, Classifier, KeywordClassifier, LengthClassifier};
pub use ledger::{BreakerState, BudgetLedger, ChargeOutcome, LedgerStatus, RejectReason};
pub use registry::{TierEntry, TierRegistry};
pub use reporter::{SessionReport, SessionReporter, TierCount};
pub use router::{Router, RoutingRequest, RoutingResult};
pub use stats::RoutingStats;

pub use cascade_core::{BreakerMode, CascadeConfig, CascadeError, Result, Tier};
