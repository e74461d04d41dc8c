use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// one fixed-fee arrears tier: a flat fee owed once an installment is
/// this many days past due
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    pub days_late: u32,
    pub fee: Money,
}

impl FeeTier {
    pub fn new(days_late: u32, fee: Money) -> Self {
        Self { days_late, fee }
    }
}

/// global arrears configuration: three fixed tiers in ascending severity
/// plus a percentage applied to an installment's principal once the mild
/// grace period has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrearsConfig {
    pub mild: FeeTier,
    pub moderate: FeeTier,
    pub severe: FeeTier,
    /// rate charged on the installment principal, compared against the
    /// fixed tier fee; the larger of the two wins
    pub percent_rate: Rate,
}

impl ArrearsConfig {
    /// fixed-tier fee for the given lateness, most severe tier first
    pub fn fixed_fee(&self, days_late: u32) -> Money {
        if days_late >= self.severe.days_late {
            self.severe.fee
        } else if days_late >= self.moderate.days_late {
            self.moderate.fee
        } else if days_late >= self.mild.days_late {
            self.mild.fee
        } else {
            Money::ZERO
        }
    }

    /// days before the percentage fee starts applying
    pub fn grace_days(&self) -> u32 {
        self.mild.days_late
    }
}

impl Default for ArrearsConfig {
    fn default() -> Self {
        Self {
            mild: FeeTier::new(5, Money::from_major(5)),
            moderate: FeeTier::new(10, Money::from_major(10)),
            severe: FeeTier::new(20, Money::from_major(20)),
            percent_rate: Rate::from_percentage(3),
        }
    }
}
