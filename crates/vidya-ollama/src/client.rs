// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama chat API.
//!
//! Speaks `POST /api/chat` with `{model, messages, stream}`: a single
//! `{message:{content}}` object when `stream` is false, otherwise
//! newline-delimited JSON objects ending with `{"done":true}`.

use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vidya_config::model::OllamaConfig;
use vidya_core::{ChunkStream, ProviderErrorKind, VidyaError};

use crate::ndjson::LineFramer;

/// One message in Ollama wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct StreamLine {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    done: bool,
}

/// HTTP client for one Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    chat_timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, VidyaError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            VidyaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                kind: ProviderErrorKind::Upstream,
                source: Some(Box::new(e)),
            }
        })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Probe the instance by listing installed models.
    pub async fn probe(&self) -> Result<(), VidyaError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(request_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(VidyaError::provider(
                format!("ollama probe returned {}", response.status()),
                ProviderErrorKind::Upstream,
            ))
        }
    }

    /// One complete chat call.
    pub async fn chat(&self, messages: &[WireMessage]) -> Result<String, VidyaError> {
        let body = ChatBody {
            model: &self.model,
            messages,
            stream: false,
        };
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        debug!(%status, model = %self.model, "ollama chat response received");
        if !status.is_success() {
            return Err(self.status_error(status, response.text().await.unwrap_or_default()));
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| VidyaError::Provider {
                message: format!("failed to parse ollama response: {e}"),
                kind: ProviderErrorKind::Upstream,
                source: Some(Box::new(e)),
            })?;
        let content = parsed.message.map(|m| m.content).unwrap_or_default();
        if content.is_empty() {
            return Err(VidyaError::provider(
                "ollama returned an empty reply",
                ProviderErrorKind::Upstream,
            ));
        }
        Ok(content)
    }

    /// One streaming chat call: each decoded increment of assistant text is
    /// yielded in arrival order.
    pub async fn chat_stream(&self, messages: &[WireMessage]) -> Result<ChunkStream, VidyaError> {
        let body = ChatBody {
            model: &self.model,
            messages,
            stream: true,
        };
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        debug!(%status, model = %self.model, "ollama stream opened");
        if !status.is_success() {
            return Err(self.status_error(status, response.text().await.unwrap_or_default()));
        }

        // State machine over the body: frame lines out of arbitrary byte
        // chunks, queue decoded text, stop at the `done` marker.
        let state = (
            response.bytes_stream(),
            LineFramer::new(),
            VecDeque::<String>::new(),
            false,
        );
        let stream = futures::stream::try_unfold(
            state,
            |(mut bytes, mut framer, mut pending, mut done)| async move {
                loop {
                    if let Some(chunk) = pending.pop_front() {
                        return Ok(Some((chunk, (bytes, framer, pending, done))));
                    }
                    if done {
                        return Ok(None);
                    }
                    match bytes.next().await {
                        None => return Ok(None),
                        Some(Err(e)) => {
                            return Err(VidyaError::Provider {
                                message: format!("ollama stream failed mid-flight: {e}"),
                                kind: ProviderErrorKind::Upstream,
                                source: Some(Box::new(e)),
                            });
                        }
                        Some(Ok(buf)) => {
                            for line in framer.push(&buf) {
                                // Lines that are not valid JSON are skipped.
                                let Ok(parsed) = serde_json::from_str::<StreamLine>(&line) else {
                                    continue;
                                };
                                if let Some(message) = parsed.message {
                                    if !message.content.is_empty() {
                                        pending.push_back(message.content);
                                    }
                                }
                                if parsed.done {
                                    done = true;
                                }
                            }
                        }
                    }
                }
            },
        );
        Ok(Box::pin(stream))
    }

    fn status_error(&self, status: reqwest::StatusCode, body: String) -> VidyaError {
        if status == reqwest::StatusCode::NOT_FOUND {
            VidyaError::provider(
                format!("model {} not found", self.model),
                ProviderErrorKind::ModelNotFound,
            )
        } else {
            VidyaError::provider(
                format!("ollama returned {status}: {body}"),
                ProviderErrorKind::Upstream,
            )
        }
    }
}

fn request_error(e: reqwest::Error) -> VidyaError {
    let kind = if e.is_timeout() {
        ProviderErrorKind::Timeout
    } else if e.is_connect() {
        ProviderErrorKind::ConnectionRefused
    } else {
        ProviderErrorKind::Upstream
    };
    VidyaError::Provider {
        message: format!("ollama request failed: {e}"),
        kind,
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OllamaClient {
        let config = OllamaConfig {
            base_url: base_url.to_string(),
            model: "llama3.2".to_string(),
            chat_timeout_secs: 5,
        };
        OllamaClient::new(&config).unwrap()
    }

    fn user_msg(content: &str) -> Vec<WireMessage> {
        vec![WireMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }]
    }

    #[tokio::test]
    async fn chat_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "A fraction is a part of a whole."}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.chat(&user_msg("what is a fraction?")).await.unwrap();
        assert_eq!(reply, "A fraction is a part of a whole.");
    }

    #[tokio::test]
    async fn empty_reply_is_a_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": ""}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.chat(&user_msg("hi")).await.unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Upstream));
    }

    #[tokio::test]
    async fn missing_model_maps_to_model_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.chat(&user_msg("hi")).await.unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::ModelNotFound));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connection_refused() {
        // Nothing listens on this port.
        let client = test_client("http://127.0.0.1:1");
        let err = client.chat(&user_msg("hi")).await.unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::ConnectionRefused));
    }

    #[tokio::test]
    async fn stream_yields_chunks_in_order_and_stops_at_done() {
        let server = MockServer::start().await;
        let ndjson = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n",
            "not json, skipped\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"!\"},\"done\":false}\n",
            "{\"done\":true}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client.chat_stream(&user_msg("hi")).await.unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }
        assert_eq!(chunks, vec!["Hel", "lo", "!"]);
    }

    #[tokio::test]
    async fn stream_propagates_http_errors_before_first_chunk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = match client.chat_stream(&user_msg("hi")).await {
            Ok(_) => panic!("expected chat_stream to return an error"),
            Err(e) => e,
        };
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Upstream));
    }

    #[tokio::test]
    async fn probe_succeeds_against_tags_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3.2"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.probe().await.unwrap();
    }
}
