// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player registration.
//!
//! Admits a player to the roster if their seeded rank is inside the
//! eligible range, recording the same ranking fields the sync job keeps
//! up to date afterwards.

use crate::db::{PlayerStore, StorageError};
use crate::models::{OsuUser, Player};
use crate::services::eligibility::{RankRange, SignupDecision};
use crate::services::osu::{FetchError, OsuService};
use chrono::Utc;
use std::sync::Arc;

/// Why a registration was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("player {0} is already registered")]
    AlreadyRegistered(u64),

    #[error("player {player_id} is outside of rank range (rank: {raw_rank}, BWS: {seeded_rank})")]
    Ineligible {
        player_id: u64,
        raw_rank: u64,
        seeded_rank: u64,
    },

    #[error("player {0} has no global rank")]
    Unranked(u64),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SignupError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(id) => SignupError::AlreadyRegistered(id),
            e => SignupError::Storage(e),
        }
    }
}

/// Adds eligible players to the roster.
#[derive(Clone)]
pub struct PlayerRegistrar {
    osu: OsuService,
    store: Arc<dyn PlayerStore>,
    range: RankRange,
}

impl PlayerRegistrar {
    pub fn new(osu: OsuService, store: Arc<dyn PlayerStore>, range: RankRange) -> Self {
        Self { osu, store, range }
    }

    /// Register `player_id` from their current osu! profile.
    ///
    /// Ineligible players are rejected without touching storage. A player
    /// already on the roster is never overwritten.
    pub async fn register(&self, player_id: u64) -> Result<Player, SignupError> {
        let profile = self.osu.get_user(player_id).await?;
        let raw_rank = profile.global_rank().ok_or(SignupError::Unranked(player_id))?;
        let decision = SignupDecision::evaluate(raw_rank, &profile.badges, &self.range);

        if !decision.eligible {
            tracing::warn!(
                player_id,
                username = %profile.username,
                "{} is not allowed to participate in the tournament. BWS rank is {} ({})",
                profile.username,
                decision.seeded_rank,
                decision.raw_rank
            );
            return Err(SignupError::Ineligible {
                player_id,
                raw_rank: decision.raw_rank,
                seeded_rank: decision.seeded_rank,
            });
        }

        let player = new_player(profile, &decision);
        self.store.create_player(&player).await?;

        tracing::info!(
            player_id,
            username = %player.username,
            seeded_rank = player.seeded_rank,
            "Player registered"
        );

        Ok(player)
    }
}

fn new_player(profile: OsuUser, decision: &SignupDecision) -> Player {
    Player {
        id: profile.id,
        username: profile.username,
        country: profile.country_code,
        raw_rank: decision.raw_rank,
        seeded_rank: decision.seeded_rank,
        badge_count: decision.badge_count,
        signup_date: Utc::now(),
        osu_join_date: profile.join_date,
    }
}
