//! Read-only session summary: cost, savings against an all-top-tier baseline,
//! and how requests were spread across tiers.

use crate::ledger::{BreakerState, BudgetLedger};
use crate::registry::TierRegistry;
use crate::stats::RoutingStats;
use cascade_core::Tier;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: Tier,
    pub backend: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub requests_routed: u64,
    /// Everything the ledger charged, including backend failures.
    pub total_cost: f64,
    pub per_tier_counts: Vec<TierCount>,
    pub estimated_baseline_cost: f64,
    pub estimated_savings: f64,
    pub savings_percent: f64,
    pub budget_remaining: f64,
    pub breaker_state: BreakerState,
}

pub struct SessionReporter<'a> {
    ledger: &'a BudgetLedger,
    registry: &'a TierRegistry,
    stats: RoutingStats,
}

impl<'a> SessionReporter<'a> {
    pub fn new(ledger: &'a BudgetLedger, registry: &'a TierRegistry, stats: RoutingStats) -> Self {
        Self { ledger, registry, stats }
    }

    pub fn report(&self) -> SessionReport {
        let status = self.ledger.get_status();
        let requests_routed = self.stats.requests_routed;
        let baseline = requests_routed as f64 * self.registry.highest().unit_cost;
        let savings = (baseline - status.spent).max(0.0);
        let savings_percent = if baseline > 0.0 { savings / baseline * 100.0 } else { 0.0 };

        let per_tier_counts = self
            .registry
            .entries()
            .iter()
            .map(|e| TierCount { tier: e.tier, backend: e.backend.clone(), count: self.stats.count_for(e.tier) })
            .collect();

        SessionReport {
            requests_routed,
            total_cost: status.spent,
            per_tier_counts,
            estimated_baseline_cost: baseline,
            estimated_savings: savings,
            savings_percent,
            budget_remaining: status.remaining,
            breaker_state: status.state,
        }
    }
}

impl SessionReport {
    pub fn count_for(&self, tier: Tier) -> u64 {
        self.per_tier_counts.iter().find(|c| c.tier == tier).map(|c| c.count).unwrap_or(0)
    }

    /// Plain-text financial summary.
    pub fn render(&self) -> String {
        let mut out = String::from("# Session Financial Report\n\n");
        let _ = writeln!(out, "requests routed:  {}", self.requests_routed);
        let _ = writeln!(out, "total cost:       ${:.4}", self.total_cost);
        let _ = writeln!(out, "baseline cost:    ${:.4}", self.estimated_baseline_cost);
        let _ = writeln!(out, "savings:          ${:.4} ({:.1}%)", self.estimated_savings, self.savings_percent);
        let _ = writeln!(out, "budget remaining: ${:.4}", self.budget_remaining);
        let _ = writeln!(out, "breaker:          {:?}", self.breaker_state);
        out.push_str("\n## Routing distribution\n");
        for c in &self.per_tier_counts {
            let _ = writeln!(out, "- {} ({}): {}", c.tier, c.backend, c.count);
        }
        out
    }
}
