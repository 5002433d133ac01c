use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complexity tier, ordered from cheapest to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Simple = 0,
    Medium = 1,
    Complex = 2,
}

impl Tier {
    pub const COUNT: usize = 3;

    /// Every tier, in ascending order.
    pub const ALL: [Tier; Tier::COUNT] = [Tier::Simple, Tier::Medium, Tier::Complex];

    /// Position of this tier in [`Tier::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The most capable (and most expensive) tier.
    pub fn highest() -> Tier {
        Tier::Complex
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Simple => "simple",
            Tier::Medium => "medium",
            Tier::Complex => "complex",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Tier::Simple),
            "medium" => Ok(Tier::Medium),
            "complex" => Ok(Tier::Complex),
            _ => Err(CascadeError::UnknownTier(s.to_string())),
        }
    }
}
