// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge-weighted seeding (BWS).
//!
//! `seeded = round(rank ^ (0.9937 ^ (badges ^ 2)))`

/// Base of the badge decay term.
pub const BADGE_DECAY_BASE: f64 = 0.9937;

/// Compute the seeded (BWS) rank from a raw global rank and an effective
/// badge count.
///
/// With no badges the raw rank is returned unchanged. Each extra badge
/// shrinks the exponent, so the result never rises above `raw_rank` and
/// approaches 1 as the badge count grows.
pub fn seeded_rank(raw_rank: u64, badge_count: u32) -> u64 {
    let badges = f64::from(badge_count);
    let exponent = BADGE_DECAY_BASE.powf(badges * badges);
    let seeded = (raw_rank as f64).powf(exponent).round();

    // f64 -> u64 casts saturate, so NaN/inf cannot panic here.
    seeded as u64
}
