use crate::types::Tier;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Unknown tier: {0}")]
    UnknownTier(String),
    #[error("Tier configured more than once: {0}")]
    DuplicateTier(Tier),
    #[error("Tier not configured: {0}")]
    MissingTier(Tier),
    #[error("Invalid unit cost for tier {tier}: {cost}")]
    NegativeCost { tier: String, cost: f64 },
    #[error("Invalid budget ceiling: {0}")]
    InvalidCeiling(f64),
    #[error("Invalid classifier configuration: {0}")]
    InvalidClassifier(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),
    #[error("Session limit reached ({0} open)")]
    SessionLimit(usize),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CascadeError {
    /// Whether this error comes from an invalid configuration table.
    ///
    /// Configuration errors only ever surface while constructing a session.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownTier(_)
                | Self::DuplicateTier(_)
                | Self::MissingTier(_)
                | Self::NegativeCost { .. }
                | Self::InvalidCeiling(_)
                | Self::InvalidClassifier(_)
                | Self::InvalidServer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CascadeError>;
