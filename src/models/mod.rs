// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod player;
pub mod profile;

pub use player::{Player, RankUpdate};
pub use profile::{Badge, GameMode, OsuUser, UserStatistics};
