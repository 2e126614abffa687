// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public read-only API routes.

use crate::error::{AppError, Result};
use crate::models::Player;
use crate::services::eligibility::SignupDecision;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 100;

/// Public API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tournament", get(get_tournament))
        .route("/api/players", get(get_players))
        .route("/api/eligibility/{player_id}", get(get_eligibility))
}

// ─── Tournament ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TournamentResponse {
    pub name: String,
    pub host: String,
}

async fn get_tournament(State(state): State<Arc<AppState>>) -> Json<TournamentResponse> {
    Json(TournamentResponse {
        name: state.config.tournament_name.clone(),
        host: state.config.tournament_host.clone(),
    })
}

// ─── Players ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlayersQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Player as shown on the public seeding list.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub username: String,
    pub country: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub raw_rank: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub seeded_rank: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub signup_date: DateTime<Utc>,
}

impl From<Player> for PlayerSummary {
    fn from(p: Player) -> Self {
        Self {
            id: p.id,
            username: p.username,
            country: p.country,
            raw_rank: p.raw_rank,
            seeded_rank: p.seeded_rank,
            signup_date: p.signup_date,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayersResponse {
    /// Total registered players, not just this page.
    pub count: usize,
    pub players: Vec<PlayerSummary>,
}

/// List players by seeding, best first.
async fn get_players(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<PlayersResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let count = state.store.count_players().await?;
    let players = state.store.list_players(limit, offset).await?;

    Ok(Json(PlayersResponse {
        count,
        players: players.into_iter().map(PlayerSummary::from).collect(),
    }))
}

// ─── Eligibility ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EligibilityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub player_id: u64,
    pub username: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub decision: SignupDecision,
}

/// Check whether an osu! player could sign up right now.
///
/// Uses the live profile, so the answer reflects current rank and badges
/// rather than whatever was last synced.
async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<u64>,
) -> Result<Json<EligibilityResponse>> {
    let profile = state.osu.get_user(player_id).await?;
    let raw_rank = profile.global_rank().ok_or_else(|| {
        AppError::BadRequest(format!("Player {} has no global rank", player_id))
    })?;

    let decision = SignupDecision::evaluate(raw_rank, &profile.badges, &state.config.rank_range);

    tracing::debug!(
        player_id,
        seeded_rank = decision.seeded_rank,
        eligible = decision.eligible,
        "Eligibility checked"
    );

    Ok(Json(EligibilityResponse {
        player_id,
        username: profile.username,
        decision,
    }))
}
