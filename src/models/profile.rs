// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! osu! API v2 user payloads.
//!
//! Only the fields the ranking sync needs are modeled; the rest of the
//! (large) user object is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User object from `GET /api/v2/users/{id}/{mode}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OsuUser {
    pub id: u64,
    pub username: String,
    pub country_code: String,
    pub join_date: Option<DateTime<Utc>>,
    pub statistics: UserStatistics,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl OsuUser {
    /// Global rank, `None` for inactive or restricted players.
    pub fn global_rank(&self) -> Option<u64> {
        self.statistics.global_rank
    }
}

/// Per-mode statistics block.
#[derive(Debug, Clone, Deserialize)]
pub struct UserStatistics {
    pub global_rank: Option<u64>,
}

/// Profile badge as awarded by the osu! team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub description: String,
    pub awarded_at: DateTime<Utc>,
}

impl Badge {
    pub fn new(description: impl Into<String>, awarded_at: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            awarded_at,
        }
    }
}

/// Ruleset whose rank is used for seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    Osu,
    Taiko,
    Fruits,
    Mania,
}

impl GameMode {
    /// Path segment used by the osu! API.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Osu => "osu",
            GameMode::Taiko => "taiko",
            GameMode::Fruits => "fruits",
            GameMode::Mania => "mania",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "osu" => Ok(GameMode::Osu),
            "taiko" => Ok(GameMode::Taiko),
            "fruits" | "catch" => Ok(GameMode::Fruits),
            "mania" => Ok(GameMode::Mania),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}
