// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory player store.

use crate::db::{PlayerStore, StorageError};
use crate::models::{Player, RankUpdate};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// Player store backed by a concurrent map. Cloning shares the map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    players: Arc<DashMap<u64, Player>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `players`.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let store = Self::new();
        for player in players {
            store.players.insert(player.id, player);
        }
        store
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn find_roster(&self) -> Result<Vec<u64>, StorageError> {
        let mut ids: Vec<u64> = self.players.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn find_player(&self, id: u64) -> Result<Player, StorageError> {
        self.players
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::NotFound(id))
    }

    async fn update_player(&self, id: u64, update: RankUpdate) -> Result<Player, StorageError> {
        // The shard lock is held for the whole mutation.
        let mut entry = self
            .players
            .get_mut(&id)
            .ok_or(StorageError::NotFound(id))?;
        entry.apply(&update);
        Ok(entry.value().clone())
    }

    async fn list_players(&self, limit: usize, offset: usize) -> Result<Vec<Player>, StorageError> {
        let mut players: Vec<Player> = self
            .players
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        players.sort_by_key(|p| (p.seeded_rank, p.id));
        Ok(players.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_players(&self) -> Result<usize, StorageError> {
        Ok(self.players.len())
    }

    async fn create_player(&self, player: &Player) -> Result<(), StorageError> {
        match self.players.entry(player.id) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(player.id)),
            Entry::Vacant(slot) => {
                slot.insert(player.clone());
                Ok(())
            }
        }
    }
}
