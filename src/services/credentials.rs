// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-credentials token for the osu! API.
//!
//! The sync job talks to osu! as the application itself, not on behalf of
//! a user, so a single service token is shared by every request. Token
//! acquisition is serialized; concurrent callers that all see a 401 end up
//! issuing one token request between them.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

/// Re-acquire this long before the declared expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Service token as issued by the osu! token endpoint.
#[derive(Clone)]
pub struct Credential {
    token_type: String,
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Value for the `Authorization` header, e.g. `Bearer abc...`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token acquisition errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("osu! credential has not been acquired yet")]
    NotInitialized,

    #[error("token request failed: {0}")]
    Request(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token_type: String,
    expires_in: i64,
    access_token: String,
}

/// Owner of the shared osu! service token.
pub struct CredentialManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    credential: RwLock<Option<Credential>>,
    /// Serializes token requests.
    refresh_lock: Mutex<()>,
}

impl CredentialManager {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.osu_token_url.clone(),
            config.osu_client_id.clone(),
            config.osu_client_secret.clone(),
            config.osu_scope.clone(),
        )
    }

    /// Request a new token and replace the current one.
    ///
    /// On failure the previous credential, if any, is left in place.
    pub async fn acquire(&self) -> Result<(), CredentialError> {
        let _guard = self.refresh_lock.lock().await;
        self.acquire_locked().await.map(|_| ())
    }

    /// Current `Authorization` header value, regardless of expiry.
    pub async fn authorization_header(&self) -> Result<String, CredentialError> {
        self.credential
            .read()
            .await
            .as_ref()
            .map(Credential::authorization_header)
            .ok_or(CredentialError::NotInitialized)
    }

    /// `Authorization` header for a token that is not about to expire,
    /// acquiring a new one first if needed.
    pub async fn valid_authorization_header(&self) -> Result<String, CredentialError> {
        if let Some(header) = self.fresh_header().await {
            return Ok(header);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we were waiting.
        if let Some(header) = self.fresh_header().await {
            return Ok(header);
        }

        tracing::info!("osu! credential missing or expiring, acquiring");
        self.acquire_locked().await
    }

    /// Replace a token the API just rejected.
    ///
    /// If the current credential is no longer `rejected_header`, someone
    /// else already refreshed it and that newer header is returned as-is.
    pub async fn refresh_after_rejection(
        &self,
        rejected_header: &str,
    ) -> Result<String, CredentialError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.credential.read().await.as_ref() {
            let header = current.authorization_header();
            if header != rejected_header {
                return Ok(header);
            }
        }

        tracing::warn!("osu! rejected the service token, re-acquiring");
        self.acquire_locked().await
    }

    /// Expiry of the current credential, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.credential.read().await.as_ref().map(|c| c.expires_at)
    }

    async fn fresh_header(&self) -> Option<String> {
        let now = Utc::now();
        self.credential
            .read()
            .await
            .as_ref()
            .filter(|c| c.is_fresh(now))
            .map(Credential::authorization_header)
    }

    /// Caller must hold `refresh_lock`.
    async fn acquire_locked(&self) -> Result<String, CredentialError> {
        let credential = match self.request_token().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire osu! credential");
                return Err(e);
            }
        };

        let header = credential.authorization_header();
        tracing::info!(expires_at = %credential.expires_at, "osu! credential acquired");
        *self.credential.write().await = Some(credential);
        Ok(header)
    }

    async fn request_token(&self) -> Result<Credential, CredentialError> {
        let body = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
            scope: &self.scope,
        };

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CredentialError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Status { status, body });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::Decode(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(CredentialError::Decode("empty access_token".to_string()));
        }

        let expires_at = expiry_after(Utc::now(), token.expires_in)?;

        Ok(Credential {
            token_type: token.token_type,
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// Absolute expiry for a token valid for `expires_in` seconds from `now`.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, CredentialError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| CredentialError::Decode(format!("expires_in out of range: {}", expires_in)))
}
