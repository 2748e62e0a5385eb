// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama direct-LLM provider for the Vidya education backend.
//!
//! Implements the fallback half of the relay's provider chain: when the RAG
//! service is down or failing, chat requests go straight to a locally hosted
//! Ollama instance with the relay's own system prompt and trimmed history.

pub mod client;
pub mod ndjson;
pub mod provider;

pub use client::{OllamaClient, WireMessage};
pub use ndjson::LineFramer;
pub use provider::OllamaProvider;
