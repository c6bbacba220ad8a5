// crates/hub-reveal/src/lib.rs
// ============================================================================
// Module: Reveal Engine Library
// Description: Rarity tiers, weighted sampling, strips, and spin control.
// Purpose: Draw a reward honoring a fixed rarity table and animate it.
// Dependencies: rand, serde, thiserror
// ============================================================================

//! ## Overview
//! The reveal engine draws one item from a case using a fixed five-tier
//! rarity table, then builds a decorative strip that is guaranteed to show
//! the drawn item at a known slot. [`RevealController`] runs one spin at a
//! time and computes the pixel offset that centers the winner.
//!
//! Randomness is always injected as an [`rand::Rng`] so draws are
//! reproducible from a seed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod case;
pub mod controller;
pub mod rarity;
pub mod sampler;
pub mod strip;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::Case;
pub use case::LEGENDARY_PLACEHOLDER_IMAGE;
pub use case::RarityItem;
pub use case::builtin_cases;
pub use case::find_case;
pub use case::mask_legendary;
pub use controller::RevealController;
pub use controller::RevealGeometry;
pub use controller::RevealState;
pub use controller::SpinPlan;
pub use rarity::Rarity;
pub use rarity::RarityWeightTable;
pub use rarity::WEIGHT_SUM_TOLERANCE;
pub use rarity::WeightTableError;
pub use sampler::WeightedSampler;
pub use strip::IDLE_STRIP_BASE_SIZE;
pub use strip::StripBuilder;
pub use strip::StripCascade;
pub use strip::idle_strip;
