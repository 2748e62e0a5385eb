// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAG microservice integration for the Vidya education backend.
//!
//! The preferred provider in the relay's fallback chain: replies are
//! augmented with content retrieved from documents the user uploaded.

pub mod client;
pub mod provider;

pub use client::{RagClient, UploadResponse};
pub use provider::RagProvider;
