// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-player ranking sync.
//!
//! Handles the core workflow:
//! 1. Fetch the player's profile from osu!
//! 2. Count competitive badges
//! 3. Compute the seeded (BWS) rank
//! 4. Store raw rank, seeded rank and badge count in one write
//! 5. Warn if the player has dropped out of the eligible range

use crate::db::{PlayerStore, StorageError};
use crate::models::RankUpdate;
use crate::services::eligibility::{RankRange, SignupDecision};
use crate::services::osu::{FetchError, OsuService};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Why a single player's sync failed.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("player {0} has no global rank")]
    Unranked(u64),
}

/// Fresh ranking data for one player after a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncedPlayer {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub player_id: u64,
    pub username: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub raw_rank: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub seeded_rank: u64,
    pub badge_count: u32,
    pub eligible: bool,
}

/// Outcome of syncing one player, as recorded in a batch report.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerOutcome {
    Synced(SyncedPlayer),
    Failed {
        #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
        player_id: u64,
        error: String,
    },
}

impl PlayerOutcome {
    pub fn player_id(&self) -> u64 {
        match self {
            PlayerOutcome::Synced(p) => p.player_id,
            PlayerOutcome::Failed { player_id, .. } => *player_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PlayerOutcome::Synced(_))
    }
}

/// Keeps one player's stored ranking in step with osu!.
#[derive(Clone)]
pub struct PlayerSynchronizer {
    osu: OsuService,
    store: Arc<dyn PlayerStore>,
    range: RankRange,
}

impl PlayerSynchronizer {
    pub fn new(osu: OsuService, store: Arc<dyn PlayerStore>, range: RankRange) -> Self {
        Self { osu, store, range }
    }

    pub fn range(&self) -> RankRange {
        self.range
    }

    /// Sync one player. Never fails: errors are logged and reported in the
    /// outcome so a batch can carry on with the next player.
    pub async fn sync_one(&self, player_id: u64) -> PlayerOutcome {
        match self.try_sync(player_id).await {
            Ok(synced) => PlayerOutcome::Synced(synced),
            Err(e) => {
                tracing::error!(player_id, error = %e, "Failed to sync player");
                PlayerOutcome::Failed {
                    player_id,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Sync one player, returning the first error encountered.
    pub async fn try_sync(&self, player_id: u64) -> Result<SyncedPlayer, SyncError> {
        tracing::debug!(player_id, "Syncing player");

        // 1. Fetch profile (rate limiting and token refresh handled by OsuService)
        let profile = self.osu.get_user(player_id).await?;
        let raw_rank = profile.global_rank().ok_or(SyncError::Unranked(player_id))?;

        // 2-3. Classify badges and compute BWS
        let decision = SignupDecision::evaluate(raw_rank, &profile.badges, &self.range);

        // 4. Single write of all three ranking fields
        let update = RankUpdate {
            raw_rank: decision.raw_rank,
            seeded_rank: decision.seeded_rank,
            badge_count: decision.badge_count,
        };
        let player = self.store.update_player(player_id, update).await?;

        // 5. Audit eligibility; ineligible players are flagged, not removed
        if decision.eligible {
            tracing::info!(
                player_id,
                username = %player.username,
                raw_rank = decision.raw_rank,
                seeded_rank = decision.seeded_rank,
                badge_count = decision.badge_count,
                "Player synced"
            );
        } else {
            tracing::warn!(
                player_id,
                username = %player.username,
                raw_rank = decision.raw_rank,
                seeded_rank = decision.seeded_rank,
                min = self.range.min,
                max = self.range.max,
                "{} is not eligible anymore. BWS rank: {} ({})",
                player.username,
                decision.seeded_rank,
                decision.raw_rank
            );
        }

        Ok(SyncedPlayer {
            player_id,
            username: player.username,
            raw_rank: decision.raw_rank,
            seeded_rank: decision.seeded_rank,
            badge_count: decision.badge_count,
            eligible: decision.eligible,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let failed = PlayerOutcome::Failed {
            player_id: 3,
            error: "player 3 has no global rank".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["player_id"], 3);

        let synced = PlayerOutcome::Synced(SyncedPlayer {
            player_id: 1,
            username: "mrekk".to_string(),
            raw_rank: 50_000,
            seeded_rank: 46_705,
            badge_count: 1,
            eligible: true,
        });
        let json = serde_json::to_value(&synced).unwrap();
        assert_eq!(json["status"], "synced");
        assert_eq!(json["seeded_rank"], 46_705);
        assert!(synced.is_success());
        assert_eq!(synced.player_id(), 1);
    }

    #[test]
    fn test_sync_error_messages() {
        let err = SyncError::from(StorageError::NotFound(9));
        assert_eq!(err.to_string(), "player 9 not found");

        let err = SyncError::Unranked(5);
        assert_eq!(err.to_string(), "player 5 has no global rank");
    }
}
