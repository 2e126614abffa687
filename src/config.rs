// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Reference values (12 h sync, 10 requests/s, BWS range 10k-100k) are
//! defaults only; every one of them can be overridden per deployment.

use crate::models::GameMode;
use crate::services::eligibility::RankRange;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://osu.ppy.sh";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 12 * 60 * 60;
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 1000;

/// Outbound request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: NonZeroU32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: NonZeroU32::new(DEFAULT_RATE_LIMIT_REQUESTS).unwrap_or(NonZeroU32::MIN),
            window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- osu! API ---
    /// osu! OAuth application ID
    pub osu_client_id: String,
    /// osu! OAuth application secret
    pub osu_client_secret: String,
    /// API base URL (no trailing slash)
    pub osu_api_base_url: String,
    /// Client-credentials token endpoint
    pub osu_token_url: String,
    /// Ruleset whose rank is used for seeding
    pub osu_mode: GameMode,
    /// OAuth scope requested for the service token
    pub osu_scope: String,

    // --- Sync ---
    /// Time between full-roster syncs
    pub sync_interval: Duration,
    /// Outbound request budget
    pub rate_limit: RateLimitConfig,
    /// Eligible seeded-rank range
    pub rank_range: RankRange,

    // --- Tournament / server ---
    pub tournament_name: String,
    pub tournament_host: String,
    /// GCP project for Firestore; in-memory storage when unset
    pub gcp_project_id: Option<String>,
    /// Bearer token for `POST /tasks/sync`; endpoint disabled when unset
    pub sync_trigger_token: Option<String>,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            osu_client_id: "test_client_id".to_string(),
            osu_client_secret: "test_secret".to_string(),
            osu_api_base_url: "http://127.0.0.1:9".to_string(),
            osu_token_url: "http://127.0.0.1:9/oauth/token".to_string(),
            osu_mode: GameMode::Osu,
            osu_scope: "public".to_string(),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            rate_limit: RateLimitConfig::default(),
            rank_range: RankRange::default(),
            tournament_name: "Test Cup".to_string(),
            tournament_host: "test_host".to_string(),
            gcp_project_id: None,
            sync_trigger_token: Some("test_trigger_token".to_string()),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let osu_api_base_url = non_empty("OSU_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let osu_token_url = non_empty("OSU_TOKEN_URL")
            .unwrap_or_else(|| format!("{}/oauth/token", osu_api_base_url));

        let osu_mode = match non_empty("OSU_MODE") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::Invalid("OSU_MODE", e))?,
            None => GameMode::default(),
        };

        let max_requests = u32::try_from(number(
            "RATE_LIMIT_REQUESTS",
            u64::from(DEFAULT_RATE_LIMIT_REQUESTS),
        ))
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ConfigError::Invalid(
            "RATE_LIMIT_REQUESTS",
            "must be between 1 and 2^32-1".to_string(),
        ))?;
        let window_ms = number("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS);
        if window_ms == 0 {
            return Err(ConfigError::Invalid(
                "RATE_LIMIT_WINDOW_MS",
                "must be positive".to_string(),
            ));
        }

        let sync_interval_secs = number("SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS);
        if sync_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "SYNC_INTERVAL_SECS",
                "must be positive".to_string(),
            ));
        }

        let default_range = RankRange::default();
        let rank_range = RankRange::new(
            number("BWS_MIN_RANK", default_range.min),
            number("BWS_MAX_RANK", default_range.max),
        );
        if rank_range.min >= rank_range.max {
            return Err(ConfigError::Invalid(
                "BWS_MIN_RANK",
                format!(
                    "min ({}) must be below max ({})",
                    rank_range.min, rank_range.max
                ),
            ));
        }

        Ok(Self {
            osu_client_id: non_empty("OSU_CLIENT_ID").ok_or(ConfigError::Missing("OSU_CLIENT_ID"))?,
            osu_client_secret: non_empty("OSU_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("OSU_CLIENT_SECRET"))?,
            osu_api_base_url,
            osu_token_url,
            osu_mode,
            osu_scope: non_empty("OSU_SCOPE").unwrap_or_else(|| "public".to_string()),
            sync_interval: Duration::from_secs(sync_interval_secs),
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_millis(window_ms),
            },
            rank_range,
            tournament_name: non_empty("TOURNAMENT_NAME")
                .unwrap_or_else(|| "osu! tournament".to_string()),
            tournament_host: non_empty("TOURNAMENT_HOST").unwrap_or_default(),
            gcp_project_id: non_empty("GCP_PROJECT_ID"),
            sync_trigger_token: non_empty("SYNC_TRIGGER_TOKEN"),
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
