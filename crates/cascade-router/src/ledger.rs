//! Budget ledger with a fail-fast circuit breaker over cumulative spend.
//!
//! `try_charge` is the single admission point. In [`BreakerMode::Latching`]
//! the first charge that would push `spent` past `ceiling` trips the breaker
//! and every later charge is rejected, whatever its amount. In
//! [`BreakerMode::PerRequest`] only the overflowing charge is rejected.
//!
//! While the breaker is active `spent <= ceiling` always holds. Once tripped,
//! `spent` is frozen.
//!
//! Amounts are kept as whole micro-units (`u64`) so that charges which
//! exactly fill the budget, such as three charges of 0.1 under 0.3, are
//! admitted. Costs finer than one micro-unit are rounded to the nearest one.

use cascade_core::{BreakerMode, BudgetConfig, CascadeError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Fraction of the ceiling at which a single warning is logged.
const WARN_FRACTION: f64 = 0.8;

/// Micro-units per unit of cost.
pub const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Convert a cost to whole micro-units. Negative costs become zero; NaN and
/// infinity saturate so they never fit under a ceiling.
pub fn to_micros(amount: f64) -> u64 {
    if amount.is_nan() {
        return u64::MAX;
    }
    (amount.max(0.0) * MICROS_PER_UNIT).round() as u64
}

pub fn from_micros(micros: u64) -> f64 {
    micros as f64 / MICROS_PER_UNIT
}

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Active,
    Tripped,
}

/// Why a charge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// This charge would have pushed spend past the ceiling.
    BudgetExceeded,
    /// The breaker tripped earlier; the ledger is closed for this session.
    AlreadyTripped,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BudgetExceeded => "budget_exceeded",
            RejectReason::AlreadyTripped => "already_tripped",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    Admitted,
    Rejected(RejectReason),
}

impl ChargeOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, ChargeOutcome::Admitted)
    }
}

/// Point-in-time view of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerStatus {
    pub spent: f64,
    pub ceiling: f64,
    pub remaining: f64,
    pub state: BreakerState,
}

#[derive(Debug)]
struct LedgerState {
    spent: u64,
    state: BreakerState,
    warned: bool,
}

/// Cumulative spend against a fixed ceiling for one session.
#[derive(Debug)]
pub struct BudgetLedger {
    ceiling: f64,
    ceiling_micros: u64,
    mode: BreakerMode,
    inner: Mutex<LedgerState>,
}

impl BudgetLedger {
    /// Latching ledger with the given ceiling.
    pub fn new(ceiling: f64) -> Result<Self> {
        Self::with_mode(ceiling, BreakerMode::Latching)
    }

    pub fn with_mode(ceiling: f64, mode: BreakerMode) -> Result<Self> {
        if !ceiling.is_finite() || ceiling < 0.0 {
            return Err(CascadeError::InvalidCeiling(ceiling));
        }
        Ok(Self {
            ceiling,
            ceiling_micros: to_micros(ceiling),
            mode,
            inner: Mutex::new(LedgerState { spent: 0, state: BreakerState::Active, warned: false }),
        })
    }

    pub fn from_config(config: &BudgetConfig) -> Result<Self> {
        Self::with_mode(config.ceiling, config.breaker)
    }

    /// Atomically admit or reject a charge of `amount`.
    ///
    /// Negative amounts are charged as zero. A non-finite amount never fits.
    pub fn try_charge(&self, amount: f64) -> ChargeOutcome {
        self.try_charge_micros(to_micros(amount))
    }

    /// [`try_charge`](Self::try_charge) for an amount already in micro-units.
    pub fn try_charge_micros(&self, amount: u64) -> ChargeOutcome {
        let mut inner = self.inner.lock();

        if inner.state == BreakerState::Tripped {
            return ChargeOutcome::Rejected(RejectReason::AlreadyTripped);
        }

        let next = match inner.spent.checked_add(amount) {
            Some(next) if next <= self.ceiling_micros => next,
            _ => {
                let spent = from_micros(inner.spent);
                let amount = from_micros(amount);
                if self.mode == BreakerMode::Latching {
                    inner.state = BreakerState::Tripped;
                    warn!(spent, amount, ceiling = self.ceiling, "budget ceiling reached, circuit breaker tripped");
                } else {
                    warn!(spent, amount, ceiling = self.ceiling, "charge rejected, over budget");
                }
                return ChargeOutcome::Rejected(RejectReason::BudgetExceeded);
            }
        };

        inner.spent = next;
        let spent = from_micros(next);
        debug!(amount = from_micros(amount), spent, ceiling = self.ceiling, "charge admitted");

        if !inner.warned && self.ceiling_micros > 0 && spent >= self.ceiling * WARN_FRACTION {
            inner.warned = true;
            warn!(spent, ceiling = self.ceiling, "approaching budget ceiling (80%+)");
        }

        ChargeOutcome::Admitted
    }

    pub fn get_status(&self) -> LedgerStatus {
        let inner = self.inner.lock();
        LedgerStatus {
            spent: from_micros(inner.spent),
            ceiling: self.ceiling,
            remaining: from_micros(self.ceiling_micros.saturating_sub(inner.spent)),
            state: inner.state,
        }
    }

    pub fn spent(&self) -> f64 {
        from_micros(self.inner.lock().spent)
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn mode(&self) -> BreakerMode {
        self.mode
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    pub fn is_tripped(&self) -> bool {
        self.state() == BreakerState::Tripped
    }
}
