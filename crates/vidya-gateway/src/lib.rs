// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Vidya education backend.
//!
//! Exposes the auth, chat (including the SSE streaming endpoint), progress,
//! analytics, and document routes over axum, with bearer-token auth on
//! everything except health and token issuance.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::{AuthState, AuthUser, TokenKeys};
pub use error::ApiError;
pub use server::{AppState, build_router, start_server};
