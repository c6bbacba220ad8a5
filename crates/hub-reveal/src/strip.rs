// crates/hub-reveal/src/strip.rs
// ============================================================================
// Module: Reveal Strips
// Description: Spin strip and idle strip construction.
// Purpose: Produce the item sequences scrolled across the reveal viewport.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! The spin strip is decorative: slot contents come from a coarse tier
//! cascade ([`StripCascade`]) that is deliberately separate from the rarity
//! table used to draw the winner. The only hard guarantee is placement: the
//! pre-drawn winner always occupies [`StripBuilder::winner_slot`].
//!
//! The idle strip is what the viewport shows before the first spin. It
//! excludes legendary items and gives each tier a share proportional to its
//! weight, with every item appearing at least once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::seq::SliceRandom;

use crate::case::RarityItem;
use crate::rarity::Rarity;
use crate::rarity::RarityWeightTable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Slot budget the idle strip distributes across tiers.
pub const IDLE_STRIP_BASE_SIZE: u32 = 200;

/// Draw attempts per slot before accepting a repeat of the previous slot.
const MAX_REPEAT_ATTEMPTS: usize = 5;

// ============================================================================
// SECTION: Cascade
// ============================================================================

/// Roll thresholds (out of 100) used to pick each strip slot's tier group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripCascade {
    /// Rolls below this use the common group.
    pub common_below: f64,
    /// Rolls below this use the mid group (purple and pink).
    pub mid_below: f64,
    /// Rolls below this use the rare group.
    pub rare_below: f64,
}

impl StripCascade {
    /// The shipped 70 / 20 / 8 / 2 cascade.
    pub const STANDARD: Self = Self {
        common_below: 70.0,
        mid_below: 90.0,
        rare_below: 98.0,
    };
}

impl Default for StripCascade {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Tier groups the cascade selects from.
struct TierGroups<'p> {
    /// Common items.
    commons: Vec<&'p RarityItem>,
    /// Purple and pink items.
    mids: Vec<&'p RarityItem>,
    /// Red items.
    rares: Vec<&'p RarityItem>,
    /// Yellow items.
    legendaries: Vec<&'p RarityItem>,
    /// Every item.
    all: Vec<&'p RarityItem>,
}

impl<'p> TierGroups<'p> {
    /// Splits `pool` into cascade groups.
    fn new(pool: &'p [RarityItem]) -> Self {
        let of = |tiers: &[Rarity]| -> Vec<&'p RarityItem> {
            pool.iter().filter(|item| tiers.contains(&item.rarity)).collect()
        };
        Self {
            commons: of(&[Rarity::Blue]),
            mids: of(&[Rarity::Purple, Rarity::Pink]),
            rares: of(&[Rarity::Red]),
            legendaries: of(&[Rarity::Yellow]),
            all: pool.iter().collect(),
        }
    }

    /// Returns the group a roll selects.
    ///
    /// Legendaries are only eligible when the winner is legendary. An empty
    /// selection falls back to commons, then to the whole pool.
    fn select(
        &self,
        cascade: &StripCascade,
        roll: f64,
        winner: &RarityItem,
    ) -> &[&'p RarityItem] {
        let group = if roll < cascade.common_below && !self.commons.is_empty() {
            &self.commons
        } else if roll < cascade.mid_below && !self.mids.is_empty() {
            &self.mids
        } else if roll < cascade.rare_below && !self.rares.is_empty() {
            &self.rares
        } else if winner.rarity.is_legendary() && !self.legendaries.is_empty() {
            &self.legendaries
        } else {
            &self.commons
        };
        if group.is_empty() { &self.all } else { group }
    }
}

// ============================================================================
// SECTION: Spin Strip
// ============================================================================

/// Builds spin strips around a pre-drawn winner.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripBuilder {
    /// Slot tier cascade.
    cascade: StripCascade,
}

impl StripBuilder {
    /// Creates a builder using `cascade`.
    #[must_use]
    pub const fn new(cascade: StripCascade) -> Self {
        Self {
            cascade,
        }
    }

    /// Returns the slot the winner is written to for a strip of `length`.
    #[must_use]
    pub const fn winner_slot(length: usize) -> usize {
        length * 4 / 5
    }

    /// Builds a strip of `length` items (at least one) with `winner` at
    /// [`Self::winner_slot`].
    ///
    /// Each slot retries up to five draws to avoid repeating the previous
    /// slot's name; a repeat is accepted after that.
    pub fn build<R: Rng + ?Sized>(
        &self,
        pool: &[RarityItem],
        winner: &RarityItem,
        length: usize,
        rng: &mut R,
    ) -> Vec<RarityItem> {
        let length = length.max(1);
        let groups = TierGroups::new(pool);
        let mut strip: Vec<RarityItem> = Vec::with_capacity(length);
        for _ in 0 .. length {
            let roll = rng.gen_range(0.0 .. 100.0);
            let group = groups.select(&self.cascade, roll, winner);
            let previous = strip.last().map(|item| item.name.as_str());
            let mut candidate = group.choose(rng).copied();
            let mut attempts = 1;
            while attempts < MAX_REPEAT_ATTEMPTS
                && candidate.is_some_and(|item| Some(item.name.as_str()) == previous)
            {
                candidate = group.choose(rng).copied();
                attempts += 1;
            }
            strip.push(candidate.map_or_else(|| winner.clone(), Clone::clone));
        }
        strip[Self::winner_slot(length)] = winner.clone();
        strip
    }
}

// ============================================================================
// SECTION: Idle Strip
// ============================================================================

/// Builds the pre-spin strip: shuffled, weighted, without legendary items.
pub fn idle_strip<R: Rng + ?Sized>(
    pool: &[RarityItem],
    table: &RarityWeightTable,
    rng: &mut R,
) -> Vec<RarityItem> {
    let mut weighted: Vec<RarityItem> = Vec::new();
    for rarity in Rarity::ALL {
        if rarity.is_legendary() {
            continue;
        }
        let tier: Vec<&RarityItem> = pool.iter().filter(|item| item.rarity == rarity).collect();
        if tier.is_empty() {
            continue;
        }
        let allocation = tier.len().max(tier_allocation(table.weight(rarity)));
        let mut rotation = shuffled(&tier, rng);
        let mut cursor = 0;
        for _ in 0 .. allocation {
            if cursor >= rotation.len() {
                rotation = shuffled(&tier, rng);
                cursor = 0;
            }
            weighted.push(rotation[cursor].clone());
            cursor += 1;
        }
    }
    if weighted.is_empty() {
        weighted = pool.to_vec();
    }
    weighted.shuffle(rng);
    weighted
}

/// Returns `round(weight / 100 * IDLE_STRIP_BASE_SIZE)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Validated weights lie in [0, 100], so the result is within [0, 200]."
)]
fn tier_allocation(weight: f64) -> usize {
    let slots = (weight / 100.0 * f64::from(IDLE_STRIP_BASE_SIZE)).round();
    slots.clamp(0.0, f64::from(IDLE_STRIP_BASE_SIZE)) as usize
}

/// Returns a shuffled copy of `items`.
fn shuffled<'p, R: Rng + ?Sized>(items: &[&'p RarityItem], rng: &mut R) -> Vec<&'p RarityItem> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

// ============================================================================
// SECTION: Tests
// ============================================================================
