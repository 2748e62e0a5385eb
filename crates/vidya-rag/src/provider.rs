// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ChatProvider` implementation over the RAG client.

use async_trait::async_trait;
use vidya_core::{
    ChatProvider, ChatReply, ChatRequest, ChunkStream, HealthStatus, VidyaError,
};

use crate::client::RagClient;

/// The retrieval-augmented provider. Sends only the raw message and
/// language: the service owns its own prompting and retrieval context.
pub struct RagProvider {
    client: RagClient,
}

impl RagProvider {
    pub fn new(client: RagClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatProvider for RagProvider {
    fn name(&self) -> &str {
        "rag"
    }

    async fn health_check(&self) -> Result<HealthStatus, VidyaError> {
        if self.client.available().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("rag service unreachable".to_string()))
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, VidyaError> {
        self.client.chat(&request.message, &request.language).await
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, VidyaError> {
        self.client
            .chat_stream(&request.message, &request.language)
            .await
    }
}
