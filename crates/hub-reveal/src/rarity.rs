// crates/hub-reveal/src/rarity.rs
// ============================================================================
// Module: Rarity Weight Table
// Description: Five rarity tiers and their draw probabilities.
// Purpose: Map a uniform roll in [0, 100) onto a tier.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Tiers are declared from most to least common. The weight table assigns
//! each tier a percentage; the percentages must sum to 100 within
//! [`WEIGHT_SUM_TOLERANCE`]. A table that fails the check is a
//! configuration bug, so construction rejects it instead of renormalizing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Allowed absolute deviation of the weight sum from 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Shipped tier weights in declaration order.
const STANDARD_WEIGHTS: [f64; 5] = [79.92, 15.98, 3.2, 0.64, 0.26];

// ============================================================================
// SECTION: Tiers
// ============================================================================

/// Rarity tier of a reveal item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Common tier.
    Blue,
    /// Uncommon tier.
    Purple,
    /// Rare tier.
    Pink,
    /// Very rare tier.
    Red,
    /// Legendary tier.
    Yellow,
}

impl Rarity {
    /// Every tier from most to least common.
    pub const ALL: [Self; 5] = [Self::Blue, Self::Purple, Self::Pink, Self::Red, Self::Yellow];

    /// Returns the tier label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Red => "red",
            Self::Yellow => "yellow",
        }
    }

    /// Returns true for the top tier.
    #[must_use]
    pub const fn is_legendary(self) -> bool {
        matches!(self, Self::Yellow)
    }

    /// Returns the declaration index of the tier.
    const fn index(self) -> usize {
        match self {
            Self::Blue => 0,
            Self::Purple => 1,
            Self::Pink => 2,
            Self::Red => 3,
            Self::Yellow => 4,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Weight table validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightTableError {
    /// A weight is negative or not finite.
    #[error("rarity weight for {rarity} is invalid: {weight}")]
    InvalidWeight {
        /// Tier with the bad weight.
        rarity: Rarity,
        /// Offending weight.
        weight: f64,
    },
    /// Weights do not sum to 100.
    #[error("rarity weights sum to {sum}, expected 100")]
    SumMismatch {
        /// Observed sum.
        sum: f64,
    },
}

// ============================================================================
// SECTION: Weight Table
// ============================================================================

/// Validated tier probability table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityWeightTable {
    /// Weights indexed by tier declaration order.
    weights: [f64; 5],
}

impl RarityWeightTable {
    /// Returns the shipped table.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            weights: STANDARD_WEIGHTS,
        }
    }

    /// Builds a table from weights given in tier declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`WeightTableError`] when a weight is invalid or the weights
    /// do not sum to 100.
    pub fn new(weights: [f64; 5]) -> Result<Self, WeightTableError> {
        let table = Self {
            weights,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks every weight and the total against [`WEIGHT_SUM_TOLERANCE`].
    ///
    /// # Errors
    ///
    /// Returns [`WeightTableError`] when the table is inconsistent.
    pub fn validate(&self) -> Result<(), WeightTableError> {
        for rarity in Rarity::ALL {
            let weight = self.weight(rarity);
            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightTableError::InvalidWeight {
                    rarity,
                    weight,
                });
            }
        }
        let sum = self.total();
        if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightTableError::SumMismatch {
                sum,
            });
        }
        Ok(())
    }

    /// Returns the weight of `rarity`.
    #[must_use]
    pub const fn weight(&self, rarity: Rarity) -> f64 {
        self.weights[rarity.index()]
    }

    /// Returns the sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Returns a copy with one weight replaced, without validating it.
    #[must_use]
    pub const fn with_weight(mut self, rarity: Rarity, weight: f64) -> Self {
        self.weights[rarity.index()] = weight;
        self
    }

    /// Maps a roll in `[0, 100)` to the first tier whose cumulative weight
    /// exceeds it.
    ///
    /// Rolls past the accumulated total land on the most common tier.
    #[must_use]
    pub fn tier_for_roll(&self, roll: f64) -> Rarity {
        let mut cumulative = 0.0;
        for rarity in Rarity::ALL {
            cumulative += self.weight(rarity);
            if roll < cumulative {
                return rarity;
            }
        }
        Rarity::Blue
    }
}

impl Default for RarityWeightTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    /// Verifies tier boundaries match the cumulative weights.
    #[test]
    fn roll_boundaries_follow_cumulative_weights() {
        let table = RarityWeightTable::standard();
        assert_eq!(table.tier_for_roll(0.0), Rarity::Blue);
        assert_eq!(table.tier_for_roll(79.91), Rarity::Blue);
        assert_eq!(table.tier_for_roll(79.93), Rarity::Purple);
        assert_eq!(table.tier_for_roll(95.89), Rarity::Purple);
        assert_eq!(table.tier_for_roll(95.95), Rarity::Pink);
        assert_eq!(table.tier_for_roll(99.2), Rarity::Red);
        assert_eq!(table.tier_for_roll(99.8), Rarity::Yellow);
        assert_eq!(table.tier_for_roll(99.999), Rarity::Yellow);
    }

    /// Verifies a roll beyond the total falls back to the common tier.
    #[test]
    fn roll_past_total_lands_on_common_tier() {
        let table = RarityWeightTable::standard().with_weight(Rarity::Yellow, 0.0);
        assert_eq!(table.tier_for_roll(99.9), Rarity::Blue);
    }

    /// Verifies negative weights fail validation.
    #[test]
    fn negative_weight_is_rejected() {
        let err = RarityWeightTable::new([100.5, -0.5, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, WeightTableError::InvalidWeight { rarity: Rarity::Purple, .. }));
    }
}
