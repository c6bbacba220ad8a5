// crates/hub-reveal/src/case.rs
// ============================================================================
// Module: Reveal Cases
// Description: Reveal items, named cases, and the built-in catalog.
// Purpose: Provide the item pools the sampler draws from.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Case`] is a named pool of [`RarityItem`]s. Two cases ship with the
//! hub. Strip displays hide legendary artwork behind a placeholder until the
//! spin settles; see [`mask_legendary`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::rarity::Rarity;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Image shown in place of legendary artwork on the strip.
pub const LEGENDARY_PLACEHOLDER_IMAGE: &str = "/drinks/gold.png";

/// Monster Energy variants: (name, image, tier).
const MONSTER_ITEMS: [(&str, &str, Rarity); 18] = [
    ("Original Zero", "/drinks/monster/original_zero.png", Rarity::Blue),
    ("Rio Punch", "/drinks/monster/rio_punch.png", Rarity::Blue),
    ("Ultra Paradise", "/drinks/monster/ultra_paradise.png", Rarity::Blue),
    ("Bad Apple", "/drinks/monster/bad_apple.png", Rarity::Blue),
    ("Ultra Black", "/drinks/monster/ultra_black.png", Rarity::Blue),
    ("Lando Norris", "/drinks/monster/lando_norris.png", Rarity::Blue),
    ("Ultra Gold", "/drinks/monster/ultra_gold.png", Rarity::Purple),
    ("Ultra Watermelon", "/drinks/monster/ultra_watermelon.png", Rarity::Purple),
    ("Ultra Rosa", "/drinks/monster/ultra_rosa.png", Rarity::Purple),
    ("Valentino Rossi", "/drinks/monster/vr46.png", Rarity::Purple),
    ("Ultra Fiesta Mango", "/drinks/monster/ultra_fiesta_mango.png", Rarity::Purple),
    ("Original", "/drinks/monster/original.png", Rarity::Pink),
    ("Full Throttle", "/drinks/monster/full_throttle.png", Rarity::Pink),
    ("Ultra Strawberry Dreams", "/drinks/monster/ultra_strawberry_dreams.png", Rarity::Pink),
    ("Aussie Lemonade", "/drinks/monster/aussie_lemonade.png", Rarity::Red),
    ("Ultra White", "/drinks/monster/ultra_white.png", Rarity::Red),
    ("Mango Loco", "/drinks/monster/mango_loco.png", Rarity::Yellow),
    ("Peachy Keen", "/drinks/monster/peachy_keen.png", Rarity::Yellow),
];

/// Burn and Red Bull variants: (name, image, tier).
const REDBULL_BURN_ITEMS: [(&str, &str, Rarity); 7] = [
    ("Burn Fruit Punch", "/drinks/burn/fruit punch.png", Rarity::Blue),
    ("Burn Apple Kiwi", "/drinks/burn/apple kiwi.png", Rarity::Purple),
    ("Burn White Citrus", "/drinks/burn/white citrus.png", Rarity::Red),
    ("Burn Classic", "/drinks/burn/burn.png", Rarity::Yellow),
    ("Red Bull Zero", "/drinks/redbull/red bull zero.png", Rarity::Blue),
    ("Red Bull Sugar Free", "/drinks/redbull/red bull sugar free.png", Rarity::Purple),
    ("Red Bull Original", "/drinks/redbull/red bull.png", Rarity::Yellow),
];

// ============================================================================
// SECTION: Types
// ============================================================================

/// One drawable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RarityItem {
    /// Display name; also the identity used for repeat checks.
    pub name: String,
    /// Image path.
    pub image: String,
    /// Rarity tier.
    pub rarity: Rarity,
}

impl RarityItem {
    /// Creates an item.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            rarity,
        }
    }
}

/// Named pool of reveal items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    /// Stable case identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Items in the case.
    pub items: Vec<RarityItem>,
}

impl Case {
    /// Returns the items of one tier.
    #[must_use]
    pub fn tier(&self, rarity: Rarity) -> Vec<&RarityItem> {
        self.items.iter().filter(|item| item.rarity == rarity).collect()
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Returns the built-in cases.
#[must_use]
pub fn builtin_cases() -> Vec<Case> {
    vec![
        case_from("monster", "Monster Energy", &MONSTER_ITEMS),
        case_from("redbullBurn", "Burn + Red Bull", &REDBULL_BURN_ITEMS),
    ]
}

/// Looks up a built-in case by identifier.
#[must_use]
pub fn find_case(id: &str) -> Option<Case> {
    builtin_cases().into_iter().find(|case| case.id == id)
}

/// Replaces legendary artwork with the placeholder image.
#[must_use]
pub fn mask_legendary(items: &[RarityItem]) -> Vec<RarityItem> {
    items
        .iter()
        .map(|item| {
            if item.rarity.is_legendary() {
                RarityItem {
                    image: LEGENDARY_PLACEHOLDER_IMAGE.to_string(),
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Builds a case from a static item table.
fn case_from(id: &str, label: &str, items: &[(&str, &str, Rarity)]) -> Case {
    Case {
        id: id.to_string(),
        label: label.to_string(),
        items: items
            .iter()
            .map(|(name, image, rarity)| RarityItem::new(*name, *image, *rarity))
            .collect(),
    }
}
