// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! osu! API v2 client.
//!
//! Handles:
//! - Authenticated GETs with the shared service token
//! - Outbound rate limiting
//! - One token refresh + retry when osu! rejects the token (401/403)

use crate::config::Config;
use crate::models::{GameMode, OsuUser};
use crate::services::credentials::{CredentialError, CredentialManager};
use crate::services::rate_limit::RateLimiter;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client used for osu! calls.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .user_agent(concat!("bws-verifier/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Failure fetching a player's data from osu!.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for player {player_id} failed: {message}")]
    Network { player_id: u64, message: String },

    #[error("osu! returned HTTP {status} for player {player_id}: {body}")]
    Status {
        player_id: u64,
        status: u16,
        body: String,
    },

    #[error("invalid osu! response for player {player_id}: {message}")]
    Decode { player_id: u64, message: String },

    #[error("no usable osu! credential: {0}")]
    Credential(#[from] CredentialError),
}

impl FetchError {
    /// Status code for HTTP-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether osu! rejected the credential itself.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Low-level osu! HTTP client.
#[derive(Clone)]
pub struct OsuClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsuClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        authorization: &str,
        player_id: u64,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network {
                player_id,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            if status == 429 {
                tracing::warn!(player_id, "osu! rate limit hit (429)");
            }

            return Err(FetchError::Status {
                player_id,
                status,
                body,
            });
        }

        response.json().await.map_err(|e| FetchError::Decode {
            player_id,
            message: e.to_string(),
        })
    }
}

/// Rate-limited, credentialed access to the osu! API.
#[derive(Clone)]
pub struct OsuService {
    client: OsuClient,
    mode: GameMode,
    credentials: Arc<CredentialManager>,
    limiter: Arc<RateLimiter>,
}

impl OsuService {
    pub fn new(
        client: OsuClient,
        mode: GameMode,
        credentials: Arc<CredentialManager>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            mode,
            credentials,
            limiter,
        }
    }

    pub fn from_config(
        http: reqwest::Client,
        config: &Config,
        credentials: Arc<CredentialManager>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self::new(
            OsuClient::new(http, config.osu_api_base_url.clone()),
            config.osu_mode,
            credentials,
            limiter,
        )
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Fetch a player's profile in the configured game mode.
    pub async fn get_user(&self, player_id: u64) -> Result<OsuUser, FetchError> {
        let path = format!("/api/v2/users/{}/{}", player_id, self.mode);
        self.get(&path, player_id).await
    }

    /// Authenticated, rate-limited GET of `path` on the API base URL.
    ///
    /// A 401/403 triggers one credential refresh and a single retry. Any
    /// other failure is returned to the caller without retrying.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, player_id: u64) -> Result<T, FetchError> {
        let authorization = self.credentials.valid_authorization_header().await?;

        self.limiter.acquire().await;
        match self.client.get_json(path, &authorization, player_id).await {
            Err(e) if e.is_auth_error() => {
                tracing::info!(player_id, status = ?e.status(), "osu! rejected token, refreshing");
                let authorization = self
                    .credentials
                    .refresh_after_rejection(&authorization)
                    .await?;

                self.limiter.acquire().await;
                self.client.get_json(path, &authorization, player_id).await
            }
            result => result,
        }
    }
}
