// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ChatProvider` implementation over the Ollama client.

use async_trait::async_trait;
use vidya_core::{
    ChatProvider, ChatReply, ChatRequest, ChunkStream, HealthStatus, VidyaError,
};

use crate::client::{OllamaClient, WireMessage};

/// The direct-LLM provider. Sends the relay-built system prompt plus the
/// trimmed conversation history.
pub struct OllamaProvider {
    client: OllamaClient,
}

impl OllamaProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// The configured model identifier, used in fallback diagnostics.
    pub fn model(&self) -> &str {
        self.client.model()
    }

    fn wire_messages(request: &ChatRequest) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.history.iter().map(|turn| WireMessage {
            role: turn.role.to_string(),
            content: turn.content.clone(),
        }));
        messages
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<HealthStatus, VidyaError> {
        match self.client.probe().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, VidyaError> {
        let content = self.client.chat(&Self::wire_messages(request)).await?;
        Ok(ChatReply {
            content,
            audio_url: None,
        })
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, VidyaError> {
        self.client.chat_stream(&Self::wire_messages(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidya_core::{ChatTurn, Role};

    fn request_with_system() -> ChatRequest {
        ChatRequest {
            message: "and decimals?".to_string(),
            history: vec![
                ChatTurn {
                    role: Role::User,
                    content: "what is a fraction?".to_string(),
                },
                ChatTurn {
                    role: Role::Assistant,
                    content: "A part of a whole.".to_string(),
                },
                ChatTurn {
                    role: Role::User,
                    content: "and decimals?".to_string(),
                },
            ],
            system_prompt: Some("You are a tutor.".to_string()),
            language: "en".to_string(),
        }
    }

    #[test]
    fn system_prompt_leads_the_wire_messages() {
        let messages = OllamaProvider::wire_messages(&request_with_system());
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, "and decimals?");
    }

    #[test]
    fn no_system_prompt_means_history_only() {
        let mut request = request_with_system();
        request.system_prompt = None;
        let messages = OllamaProvider::wire_messages(&request);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "user");
    }
}
