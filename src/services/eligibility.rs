// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tournament eligibility checks.

use crate::models::Badge;
use crate::services::{badges, bws};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Open interval of seeded ranks admitted into the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    /// Exclusive lower bound
    pub min: u64,
    /// Exclusive upper bound
    pub max: u64,
}

impl Default for RankRange {
    fn default() -> Self {
        Self {
            min: 10_000,
            max: 100_000,
        }
    }
}

impl RankRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Strict on both ends: the bounds themselves are not eligible.
    pub fn is_eligible(&self, seeded_rank: u64) -> bool {
        self.min < seeded_rank && seeded_rank < self.max
    }
}

/// Result of checking a prospective player at signup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignupDecision {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub raw_rank: u64,
    pub badge_count: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub seeded_rank: u64,
    pub eligible: bool,
}

impl SignupDecision {
    /// Classify badges, compute BWS and check it against `range`.
    pub fn evaluate(raw_rank: u64, profile_badges: &[Badge], range: &RankRange) -> Self {
        let badge_count = badges::effective_badge_count(profile_badges);
        let seeded_rank = bws::seeded_rank(raw_rank, badge_count);
        Self {
            raw_rank,
            badge_count,
            seeded_rank,
            eligible: range.is_eligible(seeded_rank),
        }
    }
}
