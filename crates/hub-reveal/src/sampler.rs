// crates/hub-reveal/src/sampler.rs
// ============================================================================
// Module: Weighted Sampler
// Description: Draw one item from a pool honoring the rarity table.
// Purpose: Decide the reveal outcome before any animation starts.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! A draw rolls `r` in `[0, 100)`, maps it to a tier through the weight
//! table, and picks uniformly inside that tier. When the tier has no items
//! the draw falls back to the common tier, then to the whole pool, so it
//! only fails for an empty pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::seq::SliceRandom;

use crate::case::RarityItem;
use crate::rarity::Rarity;
use crate::rarity::RarityWeightTable;

// ============================================================================
// SECTION: Sampler
// ============================================================================

/// Weighted draw over a [`RarityWeightTable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSampler {
    /// Tier probabilities.
    table: RarityWeightTable,
}

impl WeightedSampler {
    /// Creates a sampler over `table`.
    #[must_use]
    pub const fn new(table: RarityWeightTable) -> Self {
        Self {
            table,
        }
    }

    /// Returns the weight table.
    #[must_use]
    pub const fn table(&self) -> &RarityWeightTable {
        &self.table
    }

    /// Draws one item from `pool`, or `None` when the pool is empty.
    pub fn sample<'p, R: Rng + ?Sized>(
        &self,
        pool: &'p [RarityItem],
        rng: &mut R,
    ) -> Option<&'p RarityItem> {
        let roll = rng.gen_range(0.0 .. 100.0);
        let tier = self.table.tier_for_roll(roll);
        pick_in_tier(pool, tier, rng)
            .or_else(|| pick_in_tier(pool, Rarity::Blue, rng))
            .or_else(|| pool.choose(rng))
    }
}

/// Picks uniformly among the items of `tier`.
fn pick_in_tier<'p, R: Rng + ?Sized>(
    pool: &'p [RarityItem],
    tier: Rarity,
    rng: &mut R,
) -> Option<&'p RarityItem> {
    let candidates: Vec<&RarityItem> = pool.iter().filter(|item| item.rarity == tier).collect();
    candidates.choose(rng).copied()
}
