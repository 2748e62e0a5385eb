// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session and message operations.

use rusqlite::params;
use vidya_core::VidyaError;

use crate::database::{Database, map_tr_err};
use crate::models::{ChatMessage, ChatSession};

const SESSION_COLUMNS: &str = "id, user_id, session_name, language, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, session_id, role, content, audio_url, created_at";

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatSession> {
    Ok(ChatSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_name: row.get(2)?,
        language: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        audio_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Create a new session.
pub async fn create_session(db: &Database, session: &ChatSession) -> Result<(), VidyaError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chat_sessions (id, user_id, session_name, language, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.id,
                    session.user_id,
                    session.session_name,
                    session.language,
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by id.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<ChatSession>, VidyaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = ?1"),
                params![id],
                map_session_row,
            );
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// A user's sessions, most recently updated first.
pub async fn list_sessions_for_user(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ChatSession>, VidyaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM chat_sessions
                 WHERE user_id = ?1 ORDER BY updated_at DESC LIMIT ?2"
            ))?;
            let sessions = stmt
                .query_map(params![user_id, limit], map_session_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await
        .map_err(map_tr_err)
}

/// Append a message and bump the owning session's `updated_at`.
pub async fn insert_message(db: &Database, msg: &ChatMessage) -> Result<(), VidyaError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chat_messages (id, session_id, role, content, audio_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.id,
                    msg.session_id,
                    msg.role,
                    msg.content,
                    msg.audio_url,
                    msg.created_at,
                ],
            )?;
            tx.execute(
                "UPDATE chat_sessions SET updated_at = ?1 WHERE id = ?2",
                params![msg.created_at, msg.session_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All messages of a session in chronological order.
pub async fn get_messages(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ChatMessage>, VidyaError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                 WHERE session_id = ?1 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let messages = stmt
                .query_map(params![session_id], map_message_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// The last `n` messages of a session, returned in chronological order.
/// This is the context window handed to the direct LLM path.
pub async fn get_recent_messages(
    db: &Database,
    session_id: &str,
    n: i64,
) -> Result<Vec<ChatMessage>, VidyaError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                 WHERE session_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
            ))?;
            let mut messages = stmt
                .query_map(params![session_id, n], map_message_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a session and its messages, but only for the owning user.
///
/// Returns `false` when no matching (id, owner) pair exists, which callers
/// surface as not-found regardless of whether the id exists for someone else.
pub async fn delete_session_owned(
    db: &Database,
    session_id: &str,
    user_id: &str,
) -> Result<bool, VidyaError> {
    let session_id = session_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute(
                "DELETE FROM chat_sessions WHERE id = ?1 AND user_id = ?2",
                params![session_id, user_id],
            )?;
            if deleted > 0 {
                tx.execute(
                    "DELETE FROM chat_messages WHERE session_id = ?1",
                    params![session_id],
                )?;
            }
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Count of a user's own (`role = 'user'`) messages since `since`, across
/// all their sessions. Feeds the monthly analytics tutor-query tally.
pub async fn count_user_messages_since(
    db: &Database,
    user_id: &str,
    since: &str,
) -> Result<i64, VidyaError> {
    let user_id = user_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT count(*) FROM chat_messages m
                 JOIN chat_sessions s ON s.id = m.session_id
                 WHERE s.user_id = ?1 AND m.role = 'user' AND m.created_at >= ?2",
                params![user_id, since],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
