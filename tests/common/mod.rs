// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bws_verifier::config::Config;
use bws_verifier::db::{FirestoreDb, MemoryStore, PlayerStore};
use bws_verifier::models::Player;
use bws_verifier::routes::create_router;
use bws_verifier::services::{
    BatchScheduler, CredentialManager, OsuService, PlayerRegistrar, PlayerSynchronizer,
    RateLimiter,
};
use bws_verifier::AppState;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Check if emulator is available via environment variable.
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Fake osu! API ───────────────────────────────────────────

#[derive(Default)]
struct FakeOsuState {
    users: Mutex<HashMap<u64, Value>>,
    failures: Mutex<HashMap<u64, u16>>,
    hanging: Mutex<HashSet<u64>>,
    token_failure: Mutex<Option<u16>>,
    token_lifetime: Mutex<Option<i64>>,
    current_token: Mutex<Option<String>>,
    last_token_request: Mutex<Option<Value>>,
    tokens_issued: AtomicUsize,
    profile_requests: AtomicUsize,
    profile_arrivals: Mutex<Vec<Instant>>,
}

/// Stand-in for the osu! token and user endpoints, listening on an
/// ephemeral localhost port.
#[derive(Clone)]
pub struct FakeOsu {
    pub base_url: String,
    state: Arc<FakeOsuState>,
}

impl FakeOsu {
    pub async fn start() -> Self {
        let state = Arc::new(FakeOsuState::default());

        let app = Router::new()
            .route("/oauth/token", post(issue_token))
            .route("/api/v2/users/{id}/{mode}", get(get_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake osu! server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    pub fn add_user(&self, profile: Value) {
        let id = profile["id"].as_u64().expect("profile needs an id");
        self.state.users.lock().unwrap().insert(id, profile);
    }

    /// Answer every profile request for `id` with `status`.
    pub fn fail_with_status(&self, id: u64, status: u16) {
        self.state.failures.lock().unwrap().insert(id, status);
    }

    /// Never answer profile requests for `id`.
    pub fn hang(&self, id: u64) {
        self.state.hanging.lock().unwrap().insert(id);
    }

    /// Answer every token request with `status`.
    pub fn fail_token_requests(&self, status: u16) {
        *self.state.token_failure.lock().unwrap() = Some(status);
    }

    /// Issue tokens with this `expires_in` instead of one day.
    pub fn set_token_lifetime(&self, expires_in: i64) {
        *self.state.token_lifetime.lock().unwrap() = Some(expires_in);
    }

    /// Forget the issued token so the next profile request gets a 401.
    pub fn revoke_current_token(&self) {
        *self.state.current_token.lock().unwrap() = None;
    }

    pub fn tokens_issued(&self) -> usize {
        self.state.tokens_issued.load(Ordering::SeqCst)
    }

    pub fn profile_requests(&self) -> usize {
        self.state.profile_requests.load(Ordering::SeqCst)
    }

    /// When each profile request reached the server, in arrival order.
    pub fn profile_arrivals(&self) -> Vec<Instant> {
        self.state.profile_arrivals.lock().unwrap().clone()
    }

    pub fn last_token_request(&self) -> Option<Value> {
        self.state.last_token_request.lock().unwrap().clone()
    }
}

async fn issue_token(State(state): State<Arc<FakeOsuState>>, Json(body): Json<Value>) -> Response {
    *state.last_token_request.lock().unwrap() = Some(body);

    if let Some(status) = *state.token_failure.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "invalid_client").into_response();
    }

    let expires_in = state.token_lifetime.lock().unwrap().unwrap_or(86400);
    let n = state.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("token-{}", n);
    *state.current_token.lock().unwrap() = Some(token.clone());

    Json(json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": token,
    }))
    .into_response()
}

async fn get_user(
    State(state): State<Arc<FakeOsuState>>,
    Path((id, _mode)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    state.profile_requests.fetch_add(1, Ordering::SeqCst);
    state.profile_arrivals.lock().unwrap().push(Instant::now());

    let expected = state
        .current_token
        .lock()
        .unwrap()
        .as_ref()
        .map(|t| format!("Bearer {}", t));
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    if expected.is_none() || presented != expected {
        return (StatusCode::UNAUTHORIZED, "authentication required").into_response();
    }

    let hang = state.hanging.lock().unwrap().contains(&id);
    if hang {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }

    let failure = state.failures.lock().unwrap().get(&id).copied();
    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "scripted failure").into_response();
    }

    let profile = state.users.lock().unwrap().get(&id).cloned();
    match profile {
        Some(profile) => Json(profile).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": null }))).into_response(),
    }
}

/// osu! user payload with the given rank and badge descriptions.
pub fn profile(id: u64, username: &str, global_rank: Option<u64>, badges: &[&str]) -> Value {
    let badges: Vec<Value> = badges
        .iter()
        .map(|description| {
            json!({
                "awarded_at": "2021-06-01T00:00:00+00:00",
                "description": description,
                "image_url": "https://assets.ppy.sh/profile-badges/test.png",
                "url": ""
            })
        })
        .collect();

    json!({
        "id": id,
        "username": username,
        "country_code": "US",
        "join_date": "2015-03-14T09:26:53+00:00",
        "is_restricted": false,
        "statistics": {
            "global_rank": global_rank,
            "pp": 4321.5
        },
        "badges": badges
    })
}

/// Registered player with placeholder ranking fields.
pub fn player(id: u64, username: &str) -> Player {
    Player {
        id,
        username: username.to_string(),
        country: "US".to_string(),
        raw_rank: 0,
        seeded_rank: 0,
        badge_count: 0,
        signup_date: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap(),
        osu_join_date: None,
    }
}

// ─── Wiring ──────────────────────────────────────────────────

/// Config pointed at the fake osu! server.
pub fn test_config(osu: &FakeOsu) -> Config {
    let mut config = Config::test_default();
    config.osu_api_base_url = osu.base_url.clone();
    config.osu_token_url = osu.token_url();
    config
}

/// Everything needed to drive a sync against the fake server.
pub struct TestServices {
    pub config: Config,
    pub store: Arc<dyn PlayerStore>,
    pub credentials: Arc<CredentialManager>,
    pub limiter: Arc<RateLimiter>,
    pub osu: OsuService,
    pub scheduler: Arc<BatchScheduler>,
}

impl TestServices {
    pub fn new(config: Config, store: Arc<dyn PlayerStore>) -> Self {
        Self::with_http(config, store, reqwest::Client::new())
    }

    pub fn with_http(config: Config, store: Arc<dyn PlayerStore>, http: reqwest::Client) -> Self {
        let credentials = Arc::new(CredentialManager::from_config(http.clone(), &config));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window,
        ));
        let osu = OsuService::from_config(http, &config, credentials.clone(), limiter.clone());
        let synchronizer = PlayerSynchronizer::new(osu.clone(), store.clone(), config.rank_range);
        let scheduler = Arc::new(BatchScheduler::new(
            synchronizer,
            store.clone(),
            credentials.clone(),
            config.sync_interval,
        ));

        Self {
            config,
            store,
            credentials,
            limiter,
            osu,
            scheduler,
        }
    }

    pub fn synchronizer(&self) -> PlayerSynchronizer {
        PlayerSynchronizer::new(self.osu.clone(), self.store.clone(), self.config.rank_range)
    }

    pub fn registrar(&self) -> PlayerRegistrar {
        PlayerRegistrar::new(self.osu.clone(), self.store.clone(), self.config.rank_range)
    }

    pub fn into_state(self) -> Arc<AppState> {
        let registrar = self.registrar();
        Arc::new(AppState {
            config: self.config,
            store: self.store,
            osu: self.osu,
            scheduler: self.scheduler,
            registrar,
        })
    }
}

/// Memory store holding `players`.
pub fn memory_store(players: impl IntoIterator<Item = Player>) -> Arc<dyn PlayerStore> {
    Arc::new(MemoryStore::with_players(players))
}

pub fn empty_store() -> Arc<dyn PlayerStore> {
    Arc::new(MemoryStore::new())
}

/// Create a test app backed by the fake osu! server and a memory store.
/// Returns the router and the shared state.
pub fn create_test_app(osu: &FakeOsu, players: Vec<Player>) -> (axum::Router, Arc<AppState>) {
    let state = TestServices::new(test_config(osu), memory_store(players)).into_state();
    (create_router(state.clone()), state)
}

/// Rate budget generous enough that tests never wait on it.
pub fn unlimited_config(osu: &FakeOsu) -> Config {
    let mut config = test_config(osu);
    config.rate_limit.max_requests = NonZeroU32::new(10_000).unwrap();
    config
}
