// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StorageError;
use crate::services::osu::FetchError;
use crate::services::scheduler::BatchError;
use crate::services::signup::SignupError;
use crate::services::sync::SyncError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("osu! API error: {0}")]
    OsuApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Ranking sync failed: {0}")]
    Sync(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => AppError::NotFound(format!("Player {} not found", id)),
            StorageError::AlreadyExists(id) => {
                AppError::Conflict(format!("Player {} is already registered", id))
            }
            StorageError::Backend(msg) => AppError::Database(msg),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::OsuApi(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Fetch(e) => e.into(),
            SyncError::Storage(e) => e.into(),
            SyncError::Unranked(id) => {
                AppError::BadRequest(format!("Player {} has no global rank", id))
            }
        }
    }
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::AlreadyRegistered(_) => AppError::Conflict(err.to_string()),
            SignupError::Ineligible { .. } => AppError::NotEligible(err.to_string()),
            SignupError::Unranked(id) => {
                AppError::BadRequest(format!("Player {} has no global rank", id))
            }
            SignupError::Fetch(e) => e.into(),
            SignupError::Storage(e) => e.into(),
        }
    }
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        AppError::Sync(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, "already_registered", Some(msg.clone()))
            }
            AppError::NotEligible(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "not_eligible", Some(msg.clone()))
            }
            AppError::OsuApi(msg) => {
                tracing::warn!(error = %msg, "osu! API error");
                (StatusCode::BAD_GATEWAY, "osu_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Sync(msg) => {
                tracing::error!(error = %msg, "Ranking sync failed");
                (StatusCode::SERVICE_UNAVAILABLE, "sync_failed", Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
