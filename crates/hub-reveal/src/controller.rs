// crates/hub-reveal/src/controller.rs
// ============================================================================
// Module: Reveal Controller
// Description: Spin/reset state machine for one reveal viewport.
// Purpose: Draw a winner, build its strip, and land the viewport on it.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! [`RevealController`] moves between idle and rolling. A spin draws the
//! winner first, then builds a strip around it and computes the offset that
//! centers the winner after [`RevealGeometry::spin_rounds`] full passes.
//!
//! Offsets are committed in two phases: the spin commits a zero baseline
//! immediately and the final offset on the second [`RevealController::tick`]
//! after it, so a renderer always observes the transition start. Reset uses
//! the same two-tick delay to re-enable the transition. The controller is
//! driven by caller-supplied timestamps; it owns no timers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use serde::Serialize;

use crate::case::RarityItem;
use crate::case::mask_legendary;
use crate::rarity::RarityWeightTable;
use crate::sampler::WeightedSampler;
use crate::strip::StripBuilder;
use crate::strip::idle_strip;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Ticks between scheduling a deferred commit and applying it.
const COMMIT_DELAY_TICKS: u8 = 2;

// ============================================================================
// SECTION: Geometry
// ============================================================================

/// Strip dimensions and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealGeometry {
    /// Items per spin strip.
    pub strip_length: usize,
    /// Full strip passes before landing.
    pub spin_rounds: usize,
    /// Width of one item in pixels.
    pub item_width_px: u32,
    /// Width of the viewport in pixels.
    pub container_width_px: u32,
    /// Spin animation duration in milliseconds.
    pub animation_ms: u64,
}

impl Default for RevealGeometry {
    fn default() -> Self {
        Self {
            strip_length: 40,
            spin_rounds: 3,
            item_width_px: 160,
            container_width_px: 640,
            animation_ms: 5_500,
        }
    }
}

impl RevealGeometry {
    /// Returns the translation that centers slot `chosen_index` after the
    /// configured number of passes over a strip of `strip_len` items.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Slot counts stay far below 2^52, so the conversion is exact."
    )]
    pub fn final_offset_px(&self, strip_len: usize, chosen_index: usize) -> f64 {
        let slots = strip_len.saturating_mul(self.spin_rounds).saturating_add(chosen_index);
        let item = f64::from(self.item_width_px);
        let center = f64::from(self.container_width_px) / 2.0 - item / 2.0;
        (slots as f64) * item - center
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealState {
    /// Winner of the current or last spin.
    pub selected: Option<RarityItem>,
    /// True while a spin is animating.
    pub rolling: bool,
    /// Current strip translation in pixels.
    pub offset_px: f64,
    /// True when offset changes should animate.
    pub animate: bool,
}

impl Default for RevealState {
    fn default() -> Self {
        Self {
            selected: None,
            rolling: false,
            offset_px: 0.0,
            animate: true,
        }
    }
}

/// Outcome of one spin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinPlan {
    /// Drawn winner with its real image.
    pub winner: RarityItem,
    /// Strip as built, legendary artwork included.
    pub strip: Vec<RarityItem>,
    /// First strip index holding the winner's name.
    pub chosen_index: usize,
    /// Offset the viewport lands on.
    pub final_offset_px: f64,
    /// Timestamp at which the spin stops rolling.
    pub settles_at_ms: i64,
}

/// Deferred state change.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Commit {
    /// Apply the final spin offset.
    Offset(f64),
    /// Re-enable animated transitions.
    EnableAnimation,
}

/// Commit waiting for its tick.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingCommit {
    /// Ticks left before the commit applies.
    ticks_left: u8,
    /// Change to apply.
    commit: Commit,
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Spin/reset state machine over one item pool.
#[derive(Debug)]
pub struct RevealController<R> {
    /// Items that can be drawn.
    pool: Vec<RarityItem>,
    /// Strip dimensions and timing.
    geometry: RevealGeometry,
    /// Winner sampler.
    sampler: WeightedSampler,
    /// Strip builder.
    builder: StripBuilder,
    /// Randomness source.
    rng: R,
    /// Observable state.
    state: RevealState,
    /// Strip currently shown, legendary artwork masked.
    display_strip: Vec<RarityItem>,
    /// Deferred commit, if any.
    pending: Option<PendingCommit>,
    /// When the running spin stops rolling.
    settles_at_ms: Option<i64>,
}

impl<R: Rng> RevealController<R> {
    /// Creates an idle controller showing a weighted idle strip of `pool`.
    pub fn new(pool: Vec<RarityItem>, geometry: RevealGeometry, mut rng: R) -> Self {
        let table = RarityWeightTable::standard();
        let display_strip = mask_legendary(&idle_strip(&pool, &table, &mut rng));
        Self {
            pool,
            geometry,
            sampler: WeightedSampler::new(table),
            builder: StripBuilder::default(),
            rng,
            state: RevealState::default(),
            display_strip,
            pending: None,
            settles_at_ms: None,
        }
    }

    /// Returns the observable state.
    #[must_use]
    pub const fn state(&self) -> &RevealState {
        &self.state
    }

    /// Returns the strip currently shown.
    #[must_use]
    pub fn display_strip(&self) -> &[RarityItem] {
        &self.display_strip
    }

    /// Returns the geometry.
    #[must_use]
    pub const fn geometry(&self) -> &RevealGeometry {
        &self.geometry
    }

    /// Returns true while a spin is animating.
    #[must_use]
    pub const fn is_rolling(&self) -> bool {
        self.state.rolling
    }

    /// Starts a spin at `now_ms`.
    ///
    /// Returns `None` without changing anything when a spin is already
    /// rolling or the pool is empty.
    pub fn spin(&mut self, now_ms: i64) -> Option<SpinPlan> {
        if self.state.rolling {
            return None;
        }
        let winner = self.sampler.sample(&self.pool, &mut self.rng)?.clone();
        let strip =
            self.builder.build(&self.pool, &winner, self.geometry.strip_length, &mut self.rng);
        let chosen_index = strip
            .iter()
            .position(|item| item.name == winner.name)
            .unwrap_or_else(|| StripBuilder::winner_slot(strip.len()));
        let final_offset_px = self.geometry.final_offset_px(strip.len(), chosen_index);
        let animation_ms = i64::try_from(self.geometry.animation_ms).unwrap_or(i64::MAX);
        let settles_at_ms = now_ms.saturating_add(animation_ms);

        self.display_strip = mask_legendary(&strip);
        self.state = RevealState {
            selected: Some(winner.clone()),
            rolling: true,
            offset_px: 0.0,
            animate: true,
        };
        self.pending = Some(PendingCommit {
            ticks_left: COMMIT_DELAY_TICKS,
            commit: Commit::Offset(final_offset_px),
        });
        self.settles_at_ms = Some(settles_at_ms);

        Some(SpinPlan {
            winner,
            strip,
            chosen_index,
            final_offset_px,
            settles_at_ms,
        })
    }

    /// Advances one scheduler tick at `now_ms`.
    ///
    /// Applies a deferred commit once its delay has elapsed and ends the
    /// spin when the animation duration has passed.
    pub fn tick(&mut self, now_ms: i64) {
        if let Some(mut pending) = self.pending.take() {
            pending.ticks_left = pending.ticks_left.saturating_sub(1);
            if pending.ticks_left == 0 {
                match pending.commit {
                    Commit::Offset(offset) => self.state.offset_px = offset,
                    Commit::EnableAnimation => self.state.animate = true,
                }
            } else {
                self.pending = Some(pending);
            }
        }
        if self.settles_at_ms.is_some_and(|deadline| now_ms >= deadline) {
            self.state.rolling = false;
            self.settles_at_ms = None;
        }
    }

    /// Returns to idle without animating back.
    ///
    /// Any deferred spin offset is discarded; transitions are re-enabled
    /// two ticks later.
    pub fn reset(&mut self) {
        self.state = RevealState {
            selected: None,
            rolling: false,
            offset_px: 0.0,
            animate: false,
        };
        self.settles_at_ms = None;
        self.pending = Some(PendingCommit {
            ticks_left: COMMIT_DELAY_TICKS,
            commit: Commit::EnableAnimation,
        });
    }
}
