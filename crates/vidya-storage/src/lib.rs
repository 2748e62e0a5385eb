// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Vidya education backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! operations for progress records (with their append-only session log),
//! chat sessions/messages, and users.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, now_rfc3339};
pub use models::*;
