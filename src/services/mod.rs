// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badges;
pub mod bws;
pub mod credentials;
pub mod eligibility;
pub mod osu;
pub mod rate_limit;
pub mod scheduler;
pub mod signup;
pub mod sync;

pub use credentials::{CredentialError, CredentialManager};
pub use eligibility::{RankRange, SignupDecision};
pub use osu::{FetchError, OsuClient, OsuService};
pub use rate_limit::RateLimiter;
pub use scheduler::{BatchError, BatchReport, BatchScheduler};
pub use signup::{PlayerRegistrar, SignupError};
pub use sync::{PlayerOutcome, PlayerSynchronizer, SyncError, SyncedPlayer};
