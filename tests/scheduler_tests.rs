// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Full-roster batch runs and the periodic scheduler loop.

use async_trait::async_trait;
use bws_verifier::db::{PlayerStore, StorageError};
use bws_verifier::models::{Player, RankUpdate};
use bws_verifier::services::{BatchError, PlayerOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

mod common;
use common::{empty_store, memory_store, player, profile, unlimited_config, FakeOsu, TestServices};

/// Store whose roster cannot be read.
struct UnreachableStore;

#[async_trait]
impl PlayerStore for UnreachableStore {
    async fn find_roster(&self) -> Result<Vec<u64>, StorageError> {
        Err(StorageError::Backend("connection refused".to_string()))
    }

    async fn find_player(&self, id: u64) -> Result<Player, StorageError> {
        Err(StorageError::NotFound(id))
    }

    async fn update_player(&self, id: u64, _update: RankUpdate) -> Result<Player, StorageError> {
        Err(StorageError::NotFound(id))
    }

    async fn list_players(&self, _limit: usize, _offset: usize) -> Result<Vec<Player>, StorageError> {
        Ok(Vec::new())
    }

    async fn count_players(&self) -> Result<usize, StorageError> {
        Ok(0)
    }

    async fn create_player(&self, _player: &Player) -> Result<(), StorageError> {
        Err(StorageError::Backend("connection refused".to_string()))
    }
}

/// Three registered players; osu! never answers for player 2, so that
/// request dies on the client timeout.
fn three_player_setup(osu: &FakeOsu) -> TestServices {
    osu.add_user(profile(1, "first", Some(50_000), &["Winner of Test Cup 2021"]));
    osu.add_user(profile(2, "second", Some(60_000), &[]));
    osu.add_user(profile(3, "third", Some(20_000), &[]));
    osu.hang(2);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    TestServices::with_http(
        unlimited_config(osu),
        memory_store([player(3, "third"), player(1, "first"), player(2, "second")]),
        http,
    )
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_batch() {
    let osu = FakeOsu::start().await;
    let services = three_player_setup(&osu);

    let report = services.scheduler.run_once().await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.is_partial_failure());

    let order: Vec<u64> = report.outcomes.iter().map(|o| o.player_id()).collect();
    assert_eq!(order, vec![1, 2, 3]);
    let PlayerOutcome::Failed { player_id: 2, error } = &report.outcomes[1] else {
        panic!("expected player 2 to fail, got {:?}", report.outcomes[1]);
    };
    assert!(error.starts_with("request for player 2 failed"), "{}", error);

    assert_eq!(services.store.find_player(1).await.unwrap().seeded_rank, 46_705);
    assert_eq!(services.store.find_player(2).await.unwrap().seeded_rank, 0);
    assert_eq!(services.store.find_player(3).await.unwrap().seeded_rank, 20_000);
}

#[tokio::test]
async fn test_roster_failure_aborts_run() {
    let osu = FakeOsu::start().await;
    let services = TestServices::new(unlimited_config(&osu), Arc::new(UnreachableStore));

    let err = services.scheduler.run_once().await.unwrap_err();

    assert!(matches!(err, BatchError::Roster(StorageError::Backend(_))));
    assert_eq!(osu.profile_requests(), 0);
}

#[tokio::test]
async fn test_credential_failure_aborts_run() {
    let osu = FakeOsu::start().await;
    osu.fail_token_requests(401);
    let services = TestServices::new(unlimited_config(&osu), memory_store([player(1, "first")]));

    let err = services.scheduler.run_once().await.unwrap_err();

    assert!(matches!(err, BatchError::Credential(_)));
    assert_eq!(osu.profile_requests(), 0);
}

#[tokio::test]
async fn test_empty_roster_is_a_successful_run() {
    let osu = FakeOsu::start().await;
    let services = TestServices::new(unlimited_config(&osu), empty_store());

    let report = services.scheduler.run_once().await.unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
    assert!(report.is_complete_success());
}

#[tokio::test]
async fn test_concurrent_runs_are_serialized() {
    let osu = FakeOsu::start().await;
    let services = three_player_setup(&osu);

    let (a, b) = tokio::join!(services.scheduler.run_once(), services.scheduler.run_once());

    assert_eq!(a.unwrap().outcomes.len(), 3);
    assert_eq!(b.unwrap().outcomes.len(), 3);
    assert_eq!(osu.profile_requests(), 6);
}

#[tokio::test]
async fn test_scheduler_runs_on_interval_until_shutdown() {
    let osu = FakeOsu::start().await;
    osu.add_user(profile(1, "first", Some(50_000), &["Winner of Test Cup 2021"]));
    let mut config = unlimited_config(&osu);
    config.sync_interval = Duration::from_millis(200);
    let services = TestServices::new(config, memory_store([player(1, "first")]));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = services.scheduler.clone();
    let task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    // Nothing happens before the first interval has elapsed
    assert_eq!(osu.profile_requests(), 0);

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(osu.profile_requests() >= 2);
    assert_eq!(services.store.find_player(1).await.unwrap().seeded_rank, 46_705);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_scheduler_stops_before_first_tick() {
    let osu = FakeOsu::start().await;
    let services = TestServices::new(unlimited_config(&osu), memory_store([player(1, "first")]));
    assert_eq!(services.scheduler.interval(), Duration::from_secs(43_200));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = services.scheduler.clone();
    let task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    assert_eq!(osu.profile_requests(), 0);
}
