// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference provider for deterministic testing.
//!
//! `MockProvider` implements `ChatProvider` with a scripted FIFO of
//! outcomes, enabling fast, CI-runnable tests of the relay's fallback and
//! streaming behavior without external services.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use vidya_core::{
    ChatProvider, ChatReply, ChatRequest, ChunkStream, HealthStatus, ProviderErrorKind,
    VidyaError,
};

/// One scripted outcome for a chat call.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Succeed with this reply text.
    Reply(String),
    /// Fail the call before producing anything.
    Fail(ProviderErrorKind, String),
    /// Streaming only: emit `chunks`, then break the stream.
    StreamThenFail {
        chunks: Vec<String>,
        message: String,
    },
}

/// A mock provider that pops outcomes from a FIFO script.
///
/// When the script is empty, calls succeed with a fixed "mock reply" text.
/// Every received request is recorded for assertions on prompt policy.
pub struct MockProvider {
    name: String,
    script: Arc<Mutex<VecDeque<MockScript>>>,
    healthy: Arc<Mutex<bool>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            healthy: Arc::new(Mutex::new(true)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-load successful replies.
    pub fn with_replies(name: &str, replies: Vec<&str>) -> Self {
        let script = replies
            .into_iter()
            .map(|reply| MockScript::Reply(reply.to_string()))
            .collect::<VecDeque<_>>();
        Self {
            name: name.to_string(),
            script: Arc::new(Mutex::new(script)),
            healthy: Arc::new(Mutex::new(true)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one scripted outcome.
    pub async fn push(&self, outcome: MockScript) {
        self.script.lock().await.push_back(outcome);
    }

    /// Make subsequent health checks report unhealthy (or healthy again).
    pub async fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().await = healthy;
    }

    /// Requests received so far, in call order.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_script(&self, request: &ChatRequest) -> MockScript {
        self.requests.lock().await.push(request.clone());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockScript::Reply("mock reply".to_string()))
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<HealthStatus, VidyaError> {
        if *self.healthy.lock().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("scripted outage".to_string()))
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, VidyaError> {
        match self.next_script(request).await {
            MockScript::Reply(content) => Ok(ChatReply {
                content,
                audio_url: None,
            }),
            MockScript::Fail(kind, message) => Err(VidyaError::provider(message, kind)),
            MockScript::StreamThenFail { message, .. } => Err(VidyaError::provider(
                message,
                ProviderErrorKind::Upstream,
            )),
        }
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, VidyaError> {
        match self.next_script(request).await {
            MockScript::Reply(content) => {
                // Split into word-sized chunks to exercise reassembly.
                let chunks: Vec<Result<String, VidyaError>> = content
                    .split_inclusive(' ')
                    .map(|part| Ok(part.to_string()))
                    .collect();
                Ok(Box::pin(stream::iter(chunks)))
            }
            MockScript::Fail(kind, message) => Err(VidyaError::provider(message, kind)),
            MockScript::StreamThenFail { chunks, message } => {
                let items: Vec<Result<String, VidyaError>> = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(VidyaError::provider(
                        message,
                        ProviderErrorKind::Upstream,
                    ))))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            history: vec![],
            system_prompt: None,
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn scripted_replies_pop_in_order_then_default() {
        let provider = MockProvider::new("mock");
        provider.push(MockScript::Reply("first".into())).await;
        provider.push(MockScript::Reply("second".into())).await;

        assert_eq!(provider.chat(&request("a")).await.unwrap().content, "first");
        assert_eq!(provider.chat(&request("b")).await.unwrap().content, "second");
        assert_eq!(
            provider.chat(&request("c")).await.unwrap().content,
            "mock reply"
        );
        assert_eq!(provider.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn stream_chunks_concatenate_to_reply() {
        let provider = MockProvider::new("mock");
        provider
            .push(MockScript::Reply("hello streaming world".into()))
            .await;

        let mut stream = provider.chat_stream(&request("hi")).await.unwrap();
        let mut full = String::new();
        let mut count = 0;
        while let Some(chunk) = stream.next().await {
            full.push_str(&chunk.unwrap());
            count += 1;
        }
        assert_eq!(full, "hello streaming world");
        assert!(count > 1);
    }

    #[tokio::test]
    async fn scripted_failure_carries_kind() {
        let provider = MockProvider::new("mock");
        provider
            .push(MockScript::Fail(
                ProviderErrorKind::ConnectionRefused,
                "down".into(),
            ))
            .await;
        let err = provider.chat(&request("hi")).await.unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::ConnectionRefused));
    }

    #[tokio::test]
    async fn stream_then_fail_breaks_mid_stream() {
        let provider = MockProvider::new("mock");
        provider
            .push(MockScript::StreamThenFail {
                chunks: vec!["partial ".into(), "output".into()],
                message: "wire cut".into(),
            })
            .await;

        let mut stream = provider.chat_stream(&request("hi")).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "partial ");
        assert_eq!(stream.next().await.unwrap().unwrap(), "output");
        assert!(stream.next().await.unwrap().is_err());
    }

    #[tokio::test]
    async fn health_follows_the_switch() {
        let provider = MockProvider::new("mock");
        assert!(provider.health_check().await.unwrap().is_usable());
        provider.set_healthy(false).await;
        assert!(!provider.health_check().await.unwrap().is_usable());
    }
}
