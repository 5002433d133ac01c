//! Shared vocabulary for the cascade router: tiers, configuration and errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BreakerMode, BudgetConfig, CascadeConfig, ClassifierConfig, ClassifierPolicy, ServerConfig,
    TierSpec,
};
pub use error::{CascadeError, Result};
pub use types::Tier;
