// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat routes: send, history, delete.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use vidya_core::VidyaError;
use vidya_storage::queries::chat;
use vidya_storage::{ChatMessage, ChatSession};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

/// How many sessions the history listing returns.
const HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub session_id: String,
    pub response: String,
    pub audio_url: Option<String>,
}

/// POST /api/chat/message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let outcome = state
        .relay
        .respond(
            &user_id,
            body.session_id.as_deref(),
            &body.message,
            &body.language,
        )
        .await?;
    Ok(Json(SendMessageResponse {
        success: true,
        session_id: outcome.session_id,
        response: outcome.response,
        audio_url: outcome.audio_url,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionWithMessages {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    One {
        success: bool,
        session: SessionWithMessages,
    },
    Many {
        success: bool,
        sessions: Vec<ChatSession>,
    },
}

/// GET /api/chat/history[?sessionId=...]
pub async fn get_history(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    if let Some(session_id) = query.session_id {
        let session = chat::get_session(&state.db, &session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| VidyaError::NotFound("chat session".to_string()))?;
        let messages = chat::get_messages(&state.db, &session.id).await?;
        return Ok(Json(HistoryResponse::One {
            success: true,
            session: SessionWithMessages { session, messages },
        }));
    }

    let sessions = chat::list_sessions_for_user(&state.db, &user_id, HISTORY_LIMIT).await?;
    Ok(Json(HistoryResponse::Many {
        success: true,
        sessions,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /api/chat/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = chat::delete_session_owned(&state.db, &session_id, &user_id).await?;
    if !deleted {
        // Someone else's session reads the same as a missing one.
        return Err(VidyaError::NotFound("chat session".to_string()).into());
    }
    Ok(Json(DeleteResponse {
        success: true,
        message: "chat session deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_defaults_language_to_english() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.language, "en");
        assert!(req.session_id.is_none());
    }

    #[test]
    fn send_request_accepts_camel_case_session_id() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"message":"hi","sessionId":"abc","language":"ta"}"#).unwrap();
        assert_eq!(req.session_id.as_deref(), Some("abc"));
        assert_eq!(req.language, "ta");
    }

    #[test]
    fn history_response_flattens_session_fields() {
        let response = HistoryResponse::One {
            success: true,
            session: SessionWithMessages {
                session: ChatSession {
                    id: "s1".to_string(),
                    user_id: "u1".to_string(),
                    session_name: "New Chat".to_string(),
                    language: "en".to_string(),
                    created_at: "2026-02-01T00:00:00.000Z".to_string(),
                    updated_at: "2026-02-01T00:00:00.000Z".to_string(),
                },
                messages: vec![],
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"sessionName\":\"New Chat\""));
        assert!(json.contains("\"messages\":[]"));
    }
}
