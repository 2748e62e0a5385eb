// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait for inference providers (RAG service, Ollama).

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::VidyaError;
use crate::types::{ChatReply, ChatRequest, HealthStatus};

/// Incremental assistant text, one decoded increment per item.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, VidyaError>> + Send>>;

/// An upstream inference provider.
///
/// The relay holds an ordered list of these and commits to the first usable
/// one per request, so every provider exposes the same three capabilities:
/// a bounded health probe, a single-shot chat call, and a streaming call.
#[async_trait]
pub trait ChatProvider: Send + Sync + 'static {
    /// Short provider name used in logs and fallback diagnostics.
    fn name(&self) -> &str;

    /// Probes the provider. Callers bound this with their own timeout.
    async fn health_check(&self) -> Result<HealthStatus, VidyaError>;

    /// Sends one message and returns the full reply.
    ///
    /// An empty reply is a provider failure, not a success.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, VidyaError>;

    /// Sends one message and returns reply text incrementally, in order.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, VidyaError>;
}
