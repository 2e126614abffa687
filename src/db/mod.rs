// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The sync job only needs a handful of player operations, so storage is
//! accessed through [`PlayerStore`]. Firestore backs production; the
//! in-memory store is used for local runs without GCP and in tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{Player, RankUpdate};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const PLAYERS: &str = "players";
}

/// Storage errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("player {0} not found")]
    NotFound(u64),

    #[error("player {0} is already registered")]
    AlreadyExists(u64),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Player storage used by the sync job and the API.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// IDs of every registered player, in a stable order.
    async fn find_roster(&self) -> Result<Vec<u64>, StorageError>;

    /// Load one player.
    async fn find_player(&self, id: u64) -> Result<Player, StorageError>;

    /// Atomically overwrite the ranking fields of an existing player and
    /// return the updated record.
    async fn update_player(&self, id: u64, update: RankUpdate) -> Result<Player, StorageError>;

    /// Players ordered by seeded rank, best first.
    async fn list_players(&self, limit: usize, offset: usize) -> Result<Vec<Player>, StorageError>;

    /// Number of registered players.
    async fn count_players(&self) -> Result<usize, StorageError>;

    /// Register a new player. Fails with `AlreadyExists` if the ID is taken;
    /// an existing record is never overwritten.
    async fn create_player(&self, player: &Player) -> Result<(), StorageError>;
}
