// crates/hub-core/src/core/resolution.rs
// ============================================================================
// Module: List Resolution
// Description: Resolver output states and the dashboard view they map to.
// Purpose: Make the four resolution outcomes unrepresentable in any other form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`ListResolution`] is the resolver's result. Each variant is one of the four
//! legal outcomes, so field combinations outside them cannot be built. The
//! flat accessors expose the `widgets/rows/error/stale/offline` view callers
//! expect. [`DashboardView`] classifies a resolution into what the dashboard
//! shows, with user-facing copy that never leaks raw errors in production.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::widget::Widget;
use crate::core::widget::WidgetRow;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Banner shown above a grid backed by cached data.
pub const STALE_BANNER: &str = "Showing cached data — live updates unavailable";
/// Heading for the offline state.
pub const OFFLINE_TITLE: &str = "Widgets temporarily unavailable";
/// Body for the offline state.
pub const OFFLINE_MESSAGE: &str = "We can't reach the service right now. Try again in a bit.";
/// Heading for the empty state.
pub const EMPTY_TITLE: &str = "No widgets yet";
/// Generic error copy shown in production builds.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred.";

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Outcome of one widget list resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ListResolution {
    /// The list endpoint answered; `rows` are the raw rows used for seeding.
    Fresh {
        /// Typed widgets.
        widgets: Vec<Widget>,
        /// Raw rows as returned by the endpoint.
        rows: Vec<WidgetRow>,
    },
    /// The endpoint failed and a cached snapshot is served instead.
    Stale {
        /// Widgets rebuilt from the snapshot.
        widgets: Vec<Widget>,
        /// Failure message of the live attempt.
        error: String,
        /// Whether the failure looked like unreachability.
        offline: bool,
    },
    /// The endpoint was unreachable and no snapshot exists.
    Offline {
        /// Failure message of the live attempt.
        error: String,
    },
    /// The endpoint failed for a non-network reason and no snapshot exists.
    Failed {
        /// Failure message of the live attempt.
        error: String,
    },
}

impl ListResolution {
    /// Builds the empty outcome for a failure without a usable snapshot.
    #[must_use]
    pub fn empty_failure(error: String, offline: bool) -> Self {
        if offline {
            Self::Offline {
                error,
            }
        } else {
            Self::Failed {
                error,
            }
        }
    }

    /// Returns the widgets to display.
    #[must_use]
    pub fn widgets(&self) -> &[Widget] {
        match self {
            Self::Fresh {
                widgets, ..
            }
            | Self::Stale {
                widgets, ..
            } => widgets,
            Self::Offline {
                ..
            }
            | Self::Failed {
                ..
            } => &[],
        }
    }

    /// Returns the raw rows, present only on fresh success.
    #[must_use]
    pub fn rows(&self) -> Option<&[WidgetRow]> {
        match self {
            Self::Fresh {
                rows, ..
            } => Some(rows),
            _ => None,
        }
    }

    /// Returns the failure message, absent on fresh success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Fresh {
                ..
            } => None,
            Self::Stale {
                error, ..
            }
            | Self::Offline {
                error,
            }
            | Self::Failed {
                error,
            } => Some(error),
        }
    }

    /// Returns true when cached data is served.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Returns true when the failure was classified as unreachability.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        match self {
            Self::Stale {
                offline, ..
            } => *offline,
            Self::Offline {
                ..
            } => true,
            Self::Fresh {
                ..
            }
            | Self::Failed {
                ..
            } => false,
        }
    }

    /// Returns the flat report form of the resolution.
    #[must_use]
    pub fn report(&self) -> ResolutionReport<'_> {
        ResolutionReport {
            widgets: self.widgets(),
            rows: self.rows(),
            error: self.error(),
            stale: self.is_stale(),
            offline: self.is_offline(),
        }
    }
}

/// Flat, serializable view of a [`ListResolution`].
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport<'a> {
    /// Widgets to display.
    pub widgets: &'a [Widget],
    /// Raw rows on fresh success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<&'a [WidgetRow]>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    /// Whether cached data is served.
    pub stale: bool,
    /// Whether the failure was classified as unreachability.
    pub offline: bool,
}

// ============================================================================
// SECTION: Dashboard View
// ============================================================================

/// Build profile controlling how much error detail users may see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildProfile {
    /// Local development; raw error text may be shown.
    Development,
    /// Production; users only see generic copy.
    #[default]
    Production,
}

impl BuildProfile {
    /// Returns true for development builds.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Dashboard state derived from a resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    /// Grid backed by cached data with a banner.
    Stale {
        /// Banner copy.
        banner: &'static str,
        /// Widgets flagged stale.
        widgets: Vec<Widget>,
    },
    /// Backend unreachable and nothing cached.
    Offline {
        /// Heading copy.
        title: &'static str,
        /// Body copy.
        message: &'static str,
    },
    /// The user has no widgets.
    Empty {
        /// Heading copy.
        title: &'static str,
    },
    /// Non-network failure and nothing cached.
    Error {
        /// Message safe for the active profile.
        message: String,
    },
    /// Live grid.
    Grid {
        /// Widgets to lay out.
        widgets: Vec<Widget>,
    },
}

impl DashboardView {
    /// Classifies a resolution, checking stale, offline, empty, then error.
    #[must_use]
    pub fn classify(resolution: &ListResolution, profile: BuildProfile) -> Self {
        let widgets = resolution.widgets();
        if resolution.is_stale() {
            return Self::Stale {
                banner: STALE_BANNER,
                widgets: widgets.iter().cloned().map(Widget::into_stale).collect(),
            };
        }
        if widgets.is_empty() && resolution.is_offline() {
            return Self::Offline {
                title: OFFLINE_TITLE,
                message: OFFLINE_MESSAGE,
            };
        }
        match resolution.error() {
            None if widgets.is_empty() => Self::Empty {
                title: EMPTY_TITLE,
            },
            Some(error) if widgets.is_empty() => Self::Error {
                message: if profile.is_development() {
                    error.to_string()
                } else {
                    GENERIC_ERROR_MESSAGE.to_string()
                },
            },
            _ => Self::Grid {
                widgets: widgets.to_vec(),
            },
        }
    }

    /// Returns true when the widgets shown are served from cache.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}
