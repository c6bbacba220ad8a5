// crates/hub-core/src/runtime/offline.rs
// ============================================================================
// Module: Offline Classification
// Description: Keyword classifier for untyped failure messages.
// Purpose: Decide whether an untyped failure means the backend is unreachable.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Structured list-source errors classify themselves. Collaborators that can
//! only report a message fall back to this matcher, which recognizes timeouts,
//! connection and DNS failures, generic network wording, and any three-digit
//! code starting with `5`. Matching is case-insensitive.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keywords that indicate unreachability on their own.
const OFFLINE_KEYWORDS: [&str; 5] =
    ["backend_unreachable", "network", "econn", "enotfound", "eai_again"];

/// Word pairs that indicate unreachability when separated only by whitespace.
const OFFLINE_PAIRS: [(&str, &str); 3] =
    [("timed", "out"), ("connection", "failed"), ("fetch", "failed")];

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Returns true when `message` looks like an unreachable-backend failure.
#[must_use]
pub fn is_offline_message(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    OFFLINE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
        || OFFLINE_PAIRS.iter().any(|(first, second)| contains_pair(&lowered, first, second))
        || contains_server_error_code(&lowered)
}

/// Returns true when `first` is followed by optional whitespace and `second`.
fn contains_pair(haystack: &str, first: &str, second: &str) -> bool {
    haystack.match_indices(first).any(|(start, matched)| {
        haystack[start + matched.len() ..].trim_start().starts_with(second)
    })
}

/// Returns true when the text contains `5` followed by two digits.
fn contains_server_error_code(haystack: &str) -> bool {
    haystack
        .as_bytes()
        .windows(3)
        .any(|window| window[0] == b'5' && window[1].is_ascii_digit() && window[2].is_ascii_digit())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
