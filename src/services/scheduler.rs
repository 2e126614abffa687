// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic full-roster ranking sync.
//!
//! Players are synced one after another: they all draw from the same
//! outbound request budget, so fanning out would only queue up behind the
//! rate limiter. A player failing never stops the run; only a roster that
//! cannot be loaded or a credential that cannot be acquired does.

use crate::db::{PlayerStore, StorageError};
use crate::services::credentials::{CredentialError, CredentialManager};
use crate::services::sync::{PlayerOutcome, PlayerSynchronizer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Conditions that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to load roster: {0}")]
    Roster(#[source] StorageError),

    #[error("failed to acquire osu! credential: {0}")]
    Credential(#[source] CredentialError),
}

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BatchReport {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub started_at: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_ms: u64,
    pub succeeded: u32,
    pub failed: u32,
    /// Players that synced but are now outside the eligible range.
    pub ineligible: u32,
    pub outcomes: Vec<PlayerOutcome>,
}

impl BatchReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            elapsed_ms: 0,
            succeeded: 0,
            failed: 0,
            ineligible: 0,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, outcome: PlayerOutcome) {
        match &outcome {
            PlayerOutcome::Synced(p) => {
                self.succeeded += 1;
                if !p.eligible {
                    self.ineligible += 1;
                }
            }
            PlayerOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Returns true if every player synced.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if some players synced and some failed.
    pub fn is_partial_failure(&self) -> bool {
        self.succeeded > 0 && self.failed > 0
    }
}

/// Drives the full-roster sync on a fixed interval.
pub struct BatchScheduler {
    synchronizer: PlayerSynchronizer,
    store: Arc<dyn PlayerStore>,
    credentials: Arc<CredentialManager>,
    interval: Duration,
    /// Keeps scheduled and manually triggered runs from overlapping.
    run_lock: Mutex<()>,
}

impl BatchScheduler {
    pub fn new(
        synchronizer: PlayerSynchronizer,
        store: Arc<dyn PlayerStore>,
        credentials: Arc<CredentialManager>,
        interval: Duration,
    ) -> Self {
        Self {
            synchronizer,
            store,
            credentials,
            interval,
            run_lock: Mutex::new(()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sync every player on the roster once, in roster order.
    pub async fn run_once(&self) -> Result<BatchReport, BatchError> {
        let _guard = self.run_lock.lock().await;

        let started = Instant::now();
        let mut report = BatchReport::new(Utc::now());

        let roster = self.store.find_roster().await.map_err(BatchError::Roster)?;

        self.credentials
            .valid_authorization_header()
            .await
            .map_err(BatchError::Credential)?;

        tracing::info!(players = roster.len(), "Starting ranking sync");

        for player_id in roster {
            let outcome = self.synchronizer.sync_one(player_id).await;
            report.record(outcome);
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;

        if report.is_complete_success() {
            tracing::info!(
                succeeded = report.succeeded,
                ineligible = report.ineligible,
                elapsed_ms = report.elapsed_ms,
                "Ranking sync complete"
            );
        } else {
            tracing::warn!(
                succeeded = report.succeeded,
                failed = report.failed,
                ineligible = report.ineligible,
                elapsed_ms = report.elapsed_ms,
                "Ranking sync complete with failures"
            );
        }

        Ok(report)
    }

    /// Run a batch every `interval` until `shutdown` flips to true.
    ///
    /// The first run happens one interval after start. A fatal run is
    /// logged and the next tick tries again. Shutdown abandons an in-flight
    /// run between store writes; each player's write is a single call.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Ranking sync scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                result = self.run_once() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Ranking sync aborted");
                    }
                }
                _ = shutdown.changed() => {
                    tracing::warn!("Shutdown requested, abandoning ranking sync in progress");
                    break;
                }
            }

            if *shutdown.borrow() {
                break;
            }
        }

        tracing::info!("Ranking sync scheduler stopped");
    }
}
