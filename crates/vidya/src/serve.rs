// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vidya serve` command implementation.
//!
//! Wires storage, the syllabus, the progress tracker, the provider chain
//! (RAG first when enabled, Ollama as fallback), and the gateway, then
//! serves until interrupted.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use vidya_config::VidyaConfig;
use vidya_core::{ChatProvider, VidyaError};
use vidya_gateway::{AppState, AuthState, TokenKeys, start_server};
use vidya_ollama::{OllamaClient, OllamaProvider};
use vidya_progress::ProgressTracker;
use vidya_rag::{RagClient, RagProvider};
use vidya_relay::{ChatRelay, ProviderChain};
use vidya_storage::Database;
use vidya_syllabus::Syllabus;

/// Run the server with the given configuration.
pub async fn run_serve(config: VidyaConfig) -> Result<(), VidyaError> {
    init_tracing(&config.server.log_level);
    info!("starting vidya serve");

    if config.auth.token_secret == "dev-only-secret" {
        warn!("auth.token_secret is the development default; set a real secret in production");
    }

    let syllabus = Arc::new(Syllabus::load(
        config.syllabus.path.as_deref().map(Path::new),
    )?);
    info!(classes = syllabus.classes.len(), "syllabus loaded");

    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    info!(path = %config.storage.database_path, "storage ready");

    let tracker = Arc::new(ProgressTracker::new(
        db.clone(),
        syllabus.clone(),
        config.progress.completion_threshold_minutes,
    ));

    let ollama = OllamaClient::new(&config.ollama)?;
    let fallback_model = ollama.model().to_string();
    let rag = Arc::new(RagClient::new(&config.rag)?);

    let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();
    if config.rag.enabled {
        providers.push(Arc::new(RagProvider::new(RagClient::new(&config.rag)?)));
    } else {
        info!("rag provider disabled by config");
    }
    providers.push(Arc::new(OllamaProvider::new(ollama)));

    let chain = ProviderChain::new(
        providers,
        Duration::from_secs(config.rag.health_timeout_secs),
    );
    let relay = Arc::new(ChatRelay::new(db.clone(), chain, fallback_model));

    let state = AppState {
        db,
        relay,
        tracker,
        rag,
        syllabus,
        auth: AuthState {
            keys: Arc::new(TokenKeys::new(
                &config.auth.token_secret,
                config.auth.token_ttl_days,
            )),
        },
    };

    start_server(
        &config.server.host,
        config.server.port,
        state,
        shutdown_signal(),
    )
    .await
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(%e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, draining");
}
