// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session continuity: lookup-or-create healing and turn appends.

use tracing::{debug, warn};
use uuid::Uuid;
use vidya_core::{Role, VidyaError};
use vidya_storage::queries::chat;
use vidya_storage::{ChatMessage, ChatSession, Database, now_rfc3339};

/// Resolve the caller's session, creating one whenever the supplied id is
/// absent, malformed, unknown, or owned by someone else.
///
/// Lookup problems never fail the caller's request; only the final create
/// can. The owner check falls through to creation rather than erroring so a
/// stale id from another device (or another user) silently starts a fresh
/// conversation.
pub async fn get_or_create_session(
    db: &Database,
    user_id: &str,
    supplied_id: Option<&str>,
    language: &str,
) -> Result<ChatSession, VidyaError> {
    if let Some(id) = supplied_id {
        if Uuid::parse_str(id).is_ok() {
            match chat::get_session(db, id).await {
                Ok(Some(session)) if session.user_id == user_id => return Ok(session),
                Ok(Some(_)) => {
                    debug!(session_id = id, "session owned by another user, creating fresh");
                }
                Ok(None) => {
                    debug!(session_id = id, "session not found, creating fresh");
                }
                Err(e) => {
                    warn!(session_id = id, %e, "session lookup failed, creating fresh");
                }
            }
        } else {
            debug!(session_id = id, "malformed session id, creating fresh");
        }
    }

    let now = now_rfc3339();
    let session = ChatSession {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        session_name: "New Chat".to_string(),
        language: language.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    chat::create_session(db, &session).await?;
    Ok(session)
}

/// Append one turn to a session. Never removes prior messages; trimming for
/// LLM context happens at the relay.
pub async fn append_turn(
    db: &Database,
    session_id: &str,
    role: Role,
    content: &str,
    audio_url: Option<String>,
) -> Result<ChatMessage, VidyaError> {
    let message = ChatMessage {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        role: role.to_string(),
        content: content.to_string(),
        audio_url,
        created_at: now_rfc3339(),
    };
    chat::insert_message(db, &message).await?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn valid_existing_id_returns_the_same_session() {
        let (db, _dir) = setup_db().await;
        let created = get_or_create_session(&db, "u1", None, "en").await.unwrap();

        let found = get_or_create_session(&db, "u1", Some(&created.id), "hi")
            .await
            .unwrap();
        assert_eq!(found.id, created.id);
        // Language stays as set at creation.
        assert_eq!(found.language, "en");
    }

    #[tokio::test]
    async fn malformed_id_heals_into_a_new_session() {
        let (db, _dir) = setup_db().await;
        let session = get_or_create_session(&db, "u1", Some("definitely-not-a-uuid"), "ta")
            .await
            .unwrap();
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.language, "ta");
    }

    #[tokio::test]
    async fn unknown_id_heals_into_a_new_session() {
        let (db, _dir) = setup_db().await;
        let phantom = Uuid::new_v4().to_string();
        let session = get_or_create_session(&db, "u1", Some(&phantom), "en")
            .await
            .unwrap();
        assert_ne!(session.id, phantom);
    }

    #[tokio::test]
    async fn foreign_session_id_falls_through_to_creation() {
        let (db, _dir) = setup_db().await;
        let theirs = get_or_create_session(&db, "u1", None, "en").await.unwrap();

        let mine = get_or_create_session(&db, "u2", Some(&theirs.id), "en")
            .await
            .unwrap();
        assert_ne!(mine.id, theirs.id);
        assert_eq!(mine.user_id, "u2");
    }

    #[tokio::test]
    async fn append_turn_is_append_only() {
        let (db, _dir) = setup_db().await;
        let session = get_or_create_session(&db, "u1", None, "en").await.unwrap();

        append_turn(&db, &session.id, Role::User, "q", None).await.unwrap();
        append_turn(&db, &session.id, Role::Assistant, "a", Some("audio://x".into()))
            .await
            .unwrap();

        let messages = chat::get_messages(&db, &session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].audio_url.as_deref(), Some("audio://x"));
    }
}
