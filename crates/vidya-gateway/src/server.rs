// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use vidya_core::VidyaError;
use vidya_progress::ProgressTracker;
use vidya_rag::RagClient;
use vidya_relay::ChatRelay;
use vidya_storage::Database;
use vidya_syllabus::Syllabus;

use crate::auth::{AuthState, auth_middleware};
use crate::handlers;
use crate::sse;

/// Maximum accepted document upload size.
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub relay: Arc<ChatRelay>,
    pub tracker: Arc<ProgressTracker>,
    pub rag: Arc<RagClient>,
    pub syllabus: Arc<Syllabus>,
    pub auth: AuthState,
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    // Public routes: health and token issuance.
    let public_routes = Router::new()
        .route("/health", get(handlers::misc::get_health))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .with_state(state.clone());

    // Everything else requires a verified bearer token.
    let api_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/chat/message", post(handlers::chat::send_message))
        .route("/api/chat/stream", post(sse::stream_message))
        .route("/api/chat/history", get(handlers::chat::get_history))
        .route("/api/chat/{session_id}", delete(handlers::chat::delete_session))
        .route("/api/progress/update", post(handlers::progress::update))
        .route("/api/progress/user", get(handlers::progress::user_progress))
        .route(
            "/api/progress/subject/{subject_id}",
            get(handlers::progress::subject_progress),
        )
        .route(
            "/api/progress/chapters/{subject_id}",
            get(handlers::progress::chapter_views),
        )
        .route(
            "/api/progress/analytics/weekly",
            get(handlers::progress::weekly_analytics),
        )
        .route(
            "/api/progress/analytics/monthly",
            get(handlers::progress::monthly_analytics),
        )
        .route(
            "/api/documents/upload",
            post(handlers::documents::upload)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the listener fails or `shutdown` resolves.
pub async fn start_server(
    host: &str,
    port: u16,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), VidyaError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VidyaError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| VidyaError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
