use cascade_core::Tier;
use serde::Serialize;

/// Per-session routing counters. Only ever incremented.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingStats {
    pub requests_routed: u64,
    pub per_tier: [u64; Tier::COUNT],
    /// Cost of requests the backend answered. Charges kept after a backend
    /// failure are not included; the ledger's `spent` is the full total.
    pub delivered_cost: f64,
}

impl RoutingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successfully routed request.
    pub fn record(&mut self, tier: Tier, cost: f64) {
        self.requests_routed += 1;
        self.per_tier[tier.index()] += 1;
        self.delivered_cost += cost;
    }

    pub fn count_for(&self, tier: Tier) -> u64 {
        self.per_tier[tier.index()]
    }
}
