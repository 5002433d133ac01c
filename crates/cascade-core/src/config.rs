use crate::error::{CascadeError, Result};
use crate::types::Tier;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn s(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Top-level configuration consumed when a session is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub tiers: Vec<TierSpec>,
    pub budget: BudgetConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerConfig,
}

/// One row of the tier table: which backend serves a tier and what it costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    pub backend: String,
    pub unit_cost: f64,
}

impl TierSpec {
    pub fn new(name: impl Into<String>, backend: impl Into<String>, unit_cost: f64) -> Self {
        Self { name: name.into(), backend: backend.into(), unit_cost }
    }
}

/// Whether a single overflow halts the session or only rejects that one charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerMode {
    #[default]
    Latching,
    PerRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub ceiling: f64,
    pub breaker: BreakerMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierPolicy {
    /// Word count plus complex/simple indicator phrases, three tiers.
    #[default]
    Keyword,
    /// Character length against a single threshold, two tiers.
    Length,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub policy: ClassifierPolicy,
    pub word_threshold: usize,
    pub length_threshold: usize,
    pub complex_indicators: Vec<String>,
    pub simple_indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Open sessions allowed at once; creation beyond this is refused.
    pub max_sessions: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierSpec::new("simple", "flash", 0.001),
                TierSpec::new("medium", "pro", 0.02),
                TierSpec::new("complex", "gpt4", 0.15),
            ],
            budget: BudgetConfig::default(),
            classifier: ClassifierConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self { ceiling: 100.0, breaker: BreakerMode::Latching }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            policy: ClassifierPolicy::Keyword,
            word_threshold: 30,
            length_threshold: 100,
            complex_indicators: s(&[
                "explain", "analyze", "compare", "evaluate", "synthesize", "architecture", "design",
            ]),
            simple_indicators: s(&[
                "what is", "when", "who", "where", "define", "list", "name", "how many",
            ]),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 8080, max_sessions: 1024 }
    }
}

impl CascadeConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: CascadeConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), tiers = config.tiers.len(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        resolve_tiers(&self.tiers)?;
        self.budget.validate()?;
        self.classifier.validate()?;
        self.server.validate()
    }
}

impl BudgetConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.ceiling.is_finite() || self.ceiling < 0.0 {
            return Err(CascadeError::InvalidCeiling(self.ceiling));
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            return Err(CascadeError::InvalidServer("max_sessions must be positive".into()));
        }
        Ok(())
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        match self.policy {
            ClassifierPolicy::Keyword if self.word_threshold == 0 => Err(
                CascadeError::InvalidClassifier("word_threshold must be positive".into()),
            ),
            ClassifierPolicy::Length if self.length_threshold == 0 => Err(
                CascadeError::InvalidClassifier("length_threshold must be positive".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Resolve an ordered tier table into exactly one spec per [`Tier`], in tier order.
///
/// Fails on unknown names, duplicates, missing tiers and negative or
/// non-finite costs.
pub fn resolve_tiers(specs: &[TierSpec]) -> Result<Vec<(Tier, &TierSpec)>> {
    let mut slots: [Option<&TierSpec>; Tier::COUNT] = [None; Tier::COUNT];

    for spec in specs {
        let tier: Tier = spec.name.parse()?;
        if !spec.unit_cost.is_finite() || spec.unit_cost < 0.0 {
            return Err(CascadeError::NegativeCost { tier: spec.name.clone(), cost: spec.unit_cost });
        }
        let slot = &mut slots[tier.index()];
        if slot.is_some() {
            return Err(CascadeError::DuplicateTier(tier));
        }
        *slot = Some(spec);
    }

    Tier::ALL
        .iter()
        .map(|&tier| slots[tier.index()].map(|spec| (tier, spec)).ok_or(CascadeError::MissingTier(tier)))
        .collect()
}
