// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token check for the manual sync trigger.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require `Authorization: Bearer <SYNC_TRIGGER_TOKEN>` for `/tasks/*` routes.
///
/// With no token configured the routes are disabled and answer 404.
pub async fn require_sync_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.sync_trigger_token.as_deref() else {
        return Err(StatusCode::NOT_FOUND);
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_matches(token, expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Blocked sync trigger with invalid token");
            Err(StatusCode::FORBIDDEN)
        }
        None => {
            tracing::warn!("Blocked sync trigger without bearer token");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

fn token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
