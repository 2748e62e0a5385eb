// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted entity types.
//!
//! Timestamps are RFC 3339 strings with millisecond precision (see
//! [`crate::database::now_rfc3339`]); their lexical order matches their
//! chronological order, which the range scans rely on.

use serde::Serialize;

/// Cumulative engagement state for one (user, subject, chapter).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: String,
    pub user_id: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub chapter_id: i64,
    pub chapter_name: String,
    /// Cumulative minutes, fractional. Monotonically non-decreasing.
    pub time_spent: f64,
    /// Latched once `time_spent` crosses the completion threshold.
    pub completed: bool,
    pub last_accessed: String,
    pub created_at: String,
}

/// One time-report delta from the append-only session log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub progress_id: String,
    pub started_at: String,
    pub duration: f64,
}

/// A progress record together with its session log, as consumed by the
/// analytics aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressWithSessions {
    pub record: ProgressRecord,
    pub sessions: Vec<StudySession>,
}

/// One persisted conversation thread.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub session_name: String,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One chat turn, user or assistant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub created_at: String,
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub class_name: String,
    pub avatar: String,
    pub role: String,
    pub created_at: String,
}
