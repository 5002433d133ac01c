//! Static tier table: tier -> (backend, unit cost).

use cascade_core::config::resolve_tiers;
use cascade_core::{CascadeConfig, Result, Tier, TierSpec};
use serde::Serialize;

/// Backend and unit cost for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierEntry {
    pub tier: Tier,
    pub backend: String,
    pub unit_cost: f64,
}

/// Immutable tier table covering every [`Tier`].
///
/// Construction fails on an incomplete or invalid table, so lookups are total.
/// Share it across sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TierRegistry {
    entries: [TierEntry; Tier::COUNT],
}

impl TierRegistry {
    pub fn new(specs: &[TierSpec]) -> Result<Self> {
        let resolved = resolve_tiers(specs)?;
        let entries = std::array::from_fn(|i| {
            let (tier, spec) = resolved[i];
            TierEntry { tier, backend: spec.backend.clone(), unit_cost: spec.unit_cost }
        });
        Ok(Self { entries })
    }

    pub fn from_config(config: &CascadeConfig) -> Result<Self> {
        Self::new(&config.tiers)
    }

    pub fn entry(&self, tier: Tier) -> &TierEntry {
        &self.entries[tier.index()]
    }

    pub fn cost_of(&self, tier: Tier) -> f64 {
        self.entry(tier).unit_cost
    }

    pub fn backend_of(&self, tier: Tier) -> &str {
        &self.entry(tier).backend
    }

    /// Entries in ascending tier order.
    pub fn entries(&self) -> &[TierEntry] {
        &self.entries
    }

    /// Entry of the most capable tier, the baseline for savings estimates.
    pub fn highest(&self) -> &TierEntry {
        self.entry(Tier::highest())
    }
}
