// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vidya education backend.
//!
//! This crate provides the foundational error type, common chat types, and
//! the `ChatProvider` capability trait implemented by every inference
//! provider integration.

pub mod error;
pub mod provider;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ProviderErrorKind, VidyaError};
pub use provider::{ChatProvider, ChunkStream};
pub use types::{ChatReply, ChatRequest, ChatTurn, HealthStatus, Role};
