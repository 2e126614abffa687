// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tournament player record for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player record stored in Firestore.
///
/// Created by the signup flow. The sync job only ever touches the
/// three ranking fields, and always all three together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// osu! user ID (also used as document ID)
    pub id: u64,
    /// osu! username at signup time
    pub username: String,
    /// ISO 3166 country code
    pub country: String,
    /// Global rank as reported by osu!
    pub raw_rank: u64,
    /// Badge-weighted (BWS) rank
    pub seeded_rank: u64,
    /// Badges left after filtering out non-competitive ones
    pub badge_count: u32,
    /// When the player signed up for the tournament
    pub signup_date: DateTime<Utc>,
    /// When the osu! account was created
    pub osu_join_date: Option<DateTime<Utc>>,
}

impl Player {
    /// Overwrite the ranking fields with a fresh sync result.
    pub fn apply(&mut self, update: &RankUpdate) {
        self.raw_rank = update.raw_rank;
        self.seeded_rank = update.seeded_rank;
        self.badge_count = update.badge_count;
    }
}

/// Partial update written after a successful sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    pub raw_rank: u64,
    pub seeded_rank: u64,
    pub badge_count: u32,
}
