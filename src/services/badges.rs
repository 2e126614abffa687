// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge filtering for BWS.
//!
//! Profile badges are free text, so competitive badges are told apart from
//! community ones with a case-insensitive substring denylist. This is a
//! heuristic: a tournament badge whose description happens to contain a
//! denylisted word is dropped too.

use crate::models::Badge;

/// Lowercase substrings marking a badge as non-competitive.
pub const BADGE_DENYLIST: &[&str] = &[
    "contribution",
    "nominat",
    "assessment",
    "moderation",
    "spotlight",
    "mapper",
    "mapping",
    "aspire",
    "aspiration",
    "monthly",
    "of the month",
    "of the year",
    "outstanding",
    "longstanding",
    "idol",
    "pending",
];

/// Whether a badge description matches any denylisted category.
pub fn is_filtered(description: &str) -> bool {
    let description = description.to_lowercase();
    BADGE_DENYLIST
        .iter()
        .any(|term| description.contains(term))
}

/// Number of badges that count towards BWS.
pub fn effective_badge_count(badges: &[Badge]) -> u32 {
    let count = badges
        .iter()
        .filter(|badge| !is_filtered(&badge.description))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
