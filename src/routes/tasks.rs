// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task routes for operators and external schedulers.
//!
//! Guarded by the sync token middleware applied in routes/mod.rs.

use crate::error::Result;
use crate::routes::api::PlayerSummary;
use crate::services::scheduler::BatchReport;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Task routes (bearer token required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/sync", post(trigger_sync))
        .route("/tasks/players/{player_id}", post(register_player))
}

/// Run one full ranking sync now and return its report.
///
/// Waits for a scheduled run already in progress to finish first.
async fn trigger_sync(State(state): State<Arc<AppState>>) -> Result<Json<BatchReport>> {
    tracing::info!("Manual ranking sync triggered");
    let report = state.scheduler.run_once().await?;
    Ok(Json(report))
}

/// Add a player to the roster if their seeded rank is eligible.
///
/// 409 if already registered, 422 if outside the rank range.
async fn register_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<u64>,
) -> Result<(StatusCode, Json<PlayerSummary>)> {
    let player = state.registrar.register(player_id).await?;
    Ok((StatusCode::CREATED, Json(player.into())))
}
