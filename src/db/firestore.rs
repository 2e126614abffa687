// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Players live in the `players` collection, keyed by osu! user ID.

use crate::db::{collections, PlayerStore, StorageError};
use crate::models::{Player, RankUpdate};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{paths, FirestoreWritePrecondition};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StorageError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StorageError::Backend(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StorageError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StorageError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StorageError> {
        self.client.as_ref().ok_or_else(|| {
            StorageError::Backend("Database not connected (offline mode)".to_string())
        })
    }

    async fn get_player(&self, id: u64) -> Result<Option<Player>, StorageError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PLAYERS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn all_players(&self) -> Result<Vec<Player>, StorageError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLAYERS)
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[async_trait]
impl PlayerStore for FirestoreDb {
    async fn find_roster(&self) -> Result<Vec<u64>, StorageError> {
        let players = self.all_players().await?;
        Ok(players.into_iter().map(|p| p.id).collect())
    }

    async fn find_player(&self, id: u64) -> Result<Player, StorageError> {
        self.get_player(id).await?.ok_or(StorageError::NotFound(id))
    }

    /// Writes only the three ranking fields, in a single write with an
    /// existence precondition. Other fields are never read or rewritten, so
    /// concurrent edits to them survive.
    async fn update_player(&self, id: u64, update: RankUpdate) -> Result<Player, StorageError> {
        self.get_client()?
            .fluent()
            .update()
            .fields(paths!(RankUpdate::{raw_rank, seeded_rank, badge_count}))
            .in_col(collections::PLAYERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id.to_string())
            .object(&update)
            .execute::<Player>()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => StorageError::NotFound(id),
                e => StorageError::Backend(format!("Failed to update player {}: {}", id, e)),
            })
    }

    async fn list_players(&self, limit: usize, offset: usize) -> Result<Vec<Player>, StorageError> {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);

        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLAYERS)
            .order_by([(
                "seeded_rank",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn count_players(&self) -> Result<usize, StorageError> {
        Ok(self.all_players().await?.len())
    }

    async fn create_player(&self, player: &Player) -> Result<(), StorageError> {
        let _: Player = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::PLAYERS)
            .document_id(player.id.to_string())
            .object(player)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => StorageError::AlreadyExists(player.id),
                e => StorageError::Backend(e.to_string()),
            })?;
        Ok(())
    }
}
