// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! BWS verifier: keep tournament seeding in step with osu!
//!
//! This crate periodically re-fetches every registered player's osu!
//! profile, computes their badge-weighted seeding (BWS) rank and stores
//! it, flagging players who have drifted out of the eligible range.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::PlayerStore;
use services::{BatchScheduler, OsuService, PlayerRegistrar};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PlayerStore>,
    pub osu: OsuService,
    pub scheduler: Arc<BatchScheduler>,
    pub registrar: PlayerRegistrar,
}
