// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat relay: one user message in, one assistant reply out, through
//! the provider chain, with conversation continuity and language steering.

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use vidya_core::{
    ChatRequest, ChatTurn, ProviderErrorKind, Role, VidyaError,
};
use vidya_storage::queries::chat;
use vidya_storage::Database;

use crate::chain::ProviderChain;
use crate::event::{RelayEvent, RelayEventStream};
use crate::prompt;
use crate::session;

/// How many trailing messages travel to the direct LLM as context.
const HISTORY_WINDOW: i64 = 10;

/// Outcome of a non-streaming exchange.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub session_id: String,
    pub response: String,
    pub audio_url: Option<String>,
}

/// The relay service. Holds the provider chain and the store.
pub struct ChatRelay {
    db: Arc<Database>,
    chain: ProviderChain,
    /// Model identifier named in degradation messages.
    fallback_model: String,
}

impl ChatRelay {
    pub fn new(db: Arc<Database>, chain: ProviderChain, fallback_model: String) -> Self {
        Self {
            db,
            chain,
            fallback_model,
        }
    }

    /// One complete exchange: append the user turn, obtain a reply (or a
    /// degradation message), append and persist the assistant turn.
    ///
    /// Provider failure is never surfaced as an error; storage failure on
    /// this foreground path is.
    pub async fn respond(
        &self,
        user_id: &str,
        supplied_session_id: Option<&str>,
        message: &str,
        language: &str,
    ) -> Result<ChatOutcome, VidyaError> {
        let message = validated(message)?;
        let session =
            session::get_or_create_session(&self.db, user_id, supplied_session_id, language)
                .await?;
        info!(user_id, session_id = %session.id, language, "chat message received");

        session::append_turn(&self.db, &session.id, Role::User, message, None).await?;
        let request = self.build_request(&session.id, message, language).await?;

        let (content, audio_url) = match self.chain.complete(&request).await {
            Ok(reply) => (reply.content, reply.audio_url),
            Err(e) => {
                warn!(session_id = %session.id, %e, "all providers failed, degrading");
                (apology_for(&e, &self.fallback_model), None)
            }
        };

        session::append_turn(
            &self.db,
            &session.id,
            Role::Assistant,
            &content,
            audio_url.clone(),
        )
        .await?;

        Ok(ChatOutcome {
            session_id: session.id,
            response: content,
            audio_url,
        })
    }

    /// One streaming exchange. Chunks are forwarded in arrival order; the
    /// accumulated text is persisted exactly once when the upstream stream
    /// ends (or breaks), after which the single terminal event follows.
    ///
    /// If the returned stream is dropped mid-flight (client disconnect), the
    /// upstream read stops at the next chunk and the partial text is saved
    /// best-effort.
    pub async fn respond_stream(
        &self,
        user_id: &str,
        supplied_session_id: Option<&str>,
        message: &str,
        language: &str,
    ) -> Result<RelayEventStream, VidyaError> {
        let message = validated(message)?;
        let session =
            session::get_or_create_session(&self.db, user_id, supplied_session_id, language)
                .await?;
        info!(user_id, session_id = %session.id, language, "chat stream opened");

        session::append_turn(&self.db, &session.id, Role::User, message, None).await?;
        let request = self.build_request(&session.id, message, language).await?;

        let (tx, rx) = mpsc::channel::<RelayEvent>(32);
        let db = self.db.clone();
        let chain = self.chain.clone();
        let session_id = session.id.clone();
        let model = self.fallback_model.clone();

        tokio::spawn(async move {
            use futures::StreamExt;

            let mut full = String::new();

            match chain.open_stream(&request).await {
                Ok(mut stream) => {
                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(chunk) => {
                                full.push_str(&chunk);
                                if tx.send(RelayEvent::Chunk(chunk)).await.is_err() {
                                    info!(
                                        session_id = %session_id,
                                        "client disconnected mid-stream, aborting upstream read"
                                    );
                                    persist_partial(&db, &session_id, &full).await;
                                    return;
                                }
                            }
                            Err(e) => {
                                warn!(session_id = %session_id, %e, "stream broke mid-flight");
                                let diagnostic = apology_for(&e, &model);
                                full.push_str(&diagnostic);
                                let _ = tx.send(RelayEvent::Chunk(diagnostic)).await;
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(session_id = %session_id, %e, "no provider could stream, degrading");
                    let diagnostic = apology_for(&e, &model);
                    full = diagnostic.clone();
                    if tx.send(RelayEvent::Chunk(diagnostic)).await.is_err() {
                        persist_partial(&db, &session_id, &full).await;
                        return;
                    }
                }
            }

            let terminal = match session::append_turn(
                &db,
                &session_id,
                Role::Assistant,
                &full,
                None,
            )
            .await
            {
                Ok(_) => RelayEvent::Done {
                    session_id: session_id.clone(),
                    full_response: full,
                },
                Err(e) => {
                    error!(session_id = %session_id, %e, "failed to persist assistant turn");
                    RelayEvent::Error(format!("failed to save reply: {e}"))
                }
            };
            let _ = tx.send(terminal).await;
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(Box::pin(stream))
    }

    /// Assemble the provider request: trimmed history (which already ends
    /// with the just-appended user turn), system prompt, and the inline
    /// language directive on the last user message.
    async fn build_request(
        &self,
        session_id: &str,
        message: &str,
        language: &str,
    ) -> Result<ChatRequest, VidyaError> {
        let recent = chat::get_recent_messages(&self.db, session_id, HISTORY_WINDOW).await?;
        let mut history: Vec<ChatTurn> = recent
            .iter()
            .filter_map(|msg| {
                Role::from_str(&msg.role).ok().map(|role| ChatTurn {
                    role,
                    content: msg.content.clone(),
                })
            })
            .collect();
        prompt::steer_last_user_turn(&mut history, language);

        Ok(ChatRequest {
            message: message.to_string(),
            history,
            system_prompt: Some(prompt::system_prompt(language)),
            language: language.to_string(),
        })
    }
}

fn validated(message: &str) -> Result<&str, VidyaError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(VidyaError::Validation("message is required".to_string()));
    }
    Ok(message)
}

/// Best-effort save of partial assistant output; failures are logged and
/// swallowed because the client is already gone.
async fn persist_partial(db: &Database, session_id: &str, partial: &str) {
    if partial.is_empty() {
        return;
    }
    if let Err(e) = session::append_turn(db, session_id, Role::Assistant, partial, None).await {
        warn!(session_id, %e, "failed to persist partial reply");
    }
}

/// The fixed degradation message for a provider failure. Becomes the
/// assistant turn's content; never an error to the caller.
pub fn apology_for(err: &VidyaError, model: &str) -> String {
    match err.provider_kind() {
        Some(ProviderErrorKind::ConnectionRefused) => {
            "I'm having trouble reaching my AI service right now. Please make sure \
             the local model service is running, then ask me again."
                .to_string()
        }
        Some(ProviderErrorKind::ModelNotFound) => format!(
            "The AI model ({model}) is not installed. Please run: ollama pull {model}"
        ),
        Some(ProviderErrorKind::Timeout) => {
            "My AI service is taking too long to answer. Please try again in a moment."
                .to_string()
        }
        _ => "I apologize, but I'm having technical difficulties. Please try again in a moment."
            .to_string(),
    }
}
