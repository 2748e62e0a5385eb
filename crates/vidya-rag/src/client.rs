// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the RAG microservice.
//!
//! Contract: `GET /health` -> `{available}`, `POST /chat` ->
//! `{response|message, context_used, num_chunks}`, `POST /chat/stream` ->
//! SSE events of `{content}` increments, `POST /upload` (multipart) ->
//! `{num_chunks, message}`.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vidya_config::model::RagConfig;
use vidya_core::{ChatReply, ChunkStream, ProviderErrorKind, VidyaError};

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default = "default_true")]
    available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
    use_rag: bool,
    language: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: Option<String>,
    message: Option<String>,
    #[serde(default)]
    context_used: bool,
    #[serde(default)]
    num_chunks: u32,
    audio_url: Option<String>,
}

#[derive(Deserialize)]
struct StreamEventData {
    content: Option<String>,
}

/// Result of a document ingestion call.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub num_chunks: u32,
    #[serde(default)]
    pub message: String,
}

/// HTTP client for one RAG service instance.
#[derive(Debug, Clone)]
pub struct RagClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
    chat_timeout: Duration,
    upload_timeout: Duration,
}

impl RagClient {
    pub fn new(config: &RagConfig) -> Result<Self, VidyaError> {
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
            health_timeout: Duration::from_secs(config.health_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    /// Bounded reachability probe. Never errors: an unreachable or unhappy
    /// service reads as unavailable.
    ///
    /// A 2xx body without the `available` field counts as available -- older
    /// service builds report a richer health shape.
    pub async fn available(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => response
                .json::<HealthResponse>()
                .await
                .map(|h| h.available)
                .unwrap_or(true),
            Ok(response) => {
                debug!(status = %response.status(), "rag health probe unhappy");
                false
            }
            Err(e) => {
                debug!(%e, "rag health probe failed");
                false
            }
        }
    }

    /// One complete retrieval-augmented chat call.
    pub async fn chat(&self, message: &str, language: &str) -> Result<ChatReply, VidyaError> {
        let body = ChatBody {
            message,
            use_rag: true,
            language,
        };
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VidyaError::provider(
                format!("rag chat returned {status}"),
                ProviderErrorKind::Upstream,
            ));
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| VidyaError::Provider {
                message: format!("failed to parse rag response: {e}"),
                kind: ProviderErrorKind::Upstream,
                source: Some(Box::new(e)),
            })?;
        debug!(
            context_used = parsed.context_used,
            num_chunks = parsed.num_chunks,
            "rag chat response received"
        );

        let content = parsed.response.or(parsed.message).unwrap_or_default();
        if content.is_empty() {
            return Err(VidyaError::provider(
                "rag service returned an empty reply",
                ProviderErrorKind::Upstream,
            ));
        }
        Ok(ChatReply {
            content,
            audio_url: parsed.audio_url,
        })
    }

    /// One streaming retrieval-augmented chat call.
    pub async fn chat_stream(&self, message: &str, language: &str) -> Result<ChunkStream, VidyaError> {
        let body = ChatBody {
            message,
            use_rag: true,
            language,
        };
        let response = self
            .client
            .post(format!("{}/chat/stream", self.base_url))
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VidyaError::provider(
                format!("rag stream returned {status}"),
                ProviderErrorKind::Upstream,
            ));
        }

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|result| async move {
                match result {
                    Ok(event) => {
                        // Events that do not parse as `{content}` are skipped
                        // (keep-alives, comments).
                        let Ok(payload) = serde_json::from_str::<StreamEventData>(&event.data)
                        else {
                            return None;
                        };
                        payload.content.filter(|c| !c.is_empty()).map(Ok)
                    }
                    Err(e) => Some(Err(VidyaError::provider(
                        format!("rag stream failed mid-flight: {e}"),
                        ProviderErrorKind::Upstream,
                    ))),
                }
            });
        Ok(Box::pin(stream))
    }

    /// Relay one uploaded document to the RAG ingestion endpoint.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, VidyaError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| VidyaError::Validation(format!("invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VidyaError::provider(
                format!("rag upload returned {status}"),
                ProviderErrorKind::Upstream,
            ));
        }
        response.json().await.map_err(|e| VidyaError::Provider {
            message: format!("failed to parse upload response: {e}"),
            kind: ProviderErrorKind::Upstream,
            source: Some(Box::new(e)),
        })
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
        message: format!("rag request failed: {e}"),
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

    fn test_client(base_url: &str) -> RagClient {
        let config = RagConfig {
            enabled: true,
            base_url: base_url.to_string(),
            health_timeout_secs: 2,
            chat_timeout_secs: 5,
            upload_timeout_secs: 5,
        };
        RagClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn health_reads_available_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"available": false})),
            )
            .mount(&server)
            .await;
        assert!(!test_client(&server.uri()).available().await);
    }

    #[tokio::test]
    async fn health_treats_plain_ok_as_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy", "ollama_available": true, "model": "llama3.2"
            })))
            .mount(&server)
            .await;
        assert!(test_client(&server.uri()).available().await);
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable_not_an_error() {
        assert!(!test_client("http://127.0.0.1:1").available().await);
    }

    #[tokio::test]
    async fn chat_prefers_response_over_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(serde_json::json!({"use_rag": true, "language": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "from response",
                "message": "from message",
                "context_used": true,
                "num_chunks": 3
            })))
            .mount(&server)
            .await;

        let reply = test_client(&server.uri()).chat("q", "hi").await.unwrap();
        assert_eq!(reply.content, "from response");
    }

    #[tokio::test]
    async fn chat_falls_back_to_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "only message"
            })))
            .mount(&server)
            .await;

        let reply = test_client(&server.uri()).chat("q", "en").await.unwrap();
        assert_eq!(reply.content, "only message");
    }

    #[tokio::test]
    async fn empty_body_is_a_failure_not_a_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).chat("q", "en").await.unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Upstream));
    }

    #[tokio::test]
    async fn stream_decodes_content_events() {
        let server = MockServer::start().await;
        let sse = "data: {\"content\":\"Hi\"}\n\ndata: {\"content\":\" there\"}\n\ndata: [DONE]\n\n";
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let mut stream = test_client(&server.uri())
            .chat_stream("q", "en")
            .await
            .unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }
        assert_eq!(chunks, vec!["Hi", " there"]);
    }

    #[tokio::test]
    async fn upload_parses_chunk_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "num_chunks": 12,
                "message": "indexed"
            })))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .upload("notes.pdf", "application/pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();
        assert_eq!(result.num_chunks, 12);
        assert_eq!(result.message, "indexed");
    }
}
