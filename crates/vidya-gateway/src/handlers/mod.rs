// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

pub mod auth;
pub mod chat;
pub mod documents;
pub mod misc;
pub mod progress;
