// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BWS verifier server
//!
//! Keeps every registered tournament player's badge-weighted seeding in
//! step with their current osu! rank and badges.

use anyhow::Context;
use bws_verifier::{
    config::Config,
    db::{FirestoreDb, MemoryStore, PlayerStore},
    services::{
        osu::build_http_client, BatchScheduler, CredentialManager, OsuService,
        PlayerRegistrar, PlayerSynchronizer, RateLimiter,
    },
    AppState,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        mode = %config.osu_mode,
        min_rank = config.rank_range.min,
        max_rank = config.rank_range.max,
        "Starting BWS verifier"
    );

    // Player storage: Firestore when a project is configured, memory otherwise
    let store: Arc<dyn PlayerStore> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(
            FirestoreDb::new(project_id)
                .await
                .context("Failed to connect to Firestore")?,
        ),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, using in-memory player store");
            Arc::new(MemoryStore::new())
        }
    };

    // osu! API access: one HTTP client, one service token, one request budget
    let http = build_http_client().context("Failed to build HTTP client")?;
    let credentials = Arc::new(CredentialManager::from_config(http.clone(), &config));
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window,
    ));
    let osu = OsuService::from_config(http, &config, credentials.clone(), limiter);

    // A failure here is not fatal; every sync run re-acquires as needed.
    if let Err(e) = credentials.acquire().await {
        tracing::error!(error = %e, "Initial osu! credential acquisition failed");
    }

    let registrar = PlayerRegistrar::new(osu.clone(), store.clone(), config.rank_range);
    let synchronizer = PlayerSynchronizer::new(osu.clone(), store.clone(), config.rank_range);
    let scheduler = Arc::new(BatchScheduler::new(
        synchronizer,
        store.clone(),
        credentials,
        config.sync_interval,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        osu,
        scheduler,
        registrar,
    });

    // Build router
    let app = bws_verifier::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped, waiting for scheduler");
    let _ = shutdown_tx.send(true);
    scheduler_task.await.context("Scheduler task panicked")?;

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM (sent by Cloud Run before stopping an instance).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bws_verifier=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
