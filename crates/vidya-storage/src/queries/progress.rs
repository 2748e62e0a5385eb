// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress record operations.
//!
//! `report_time` is the single write path: an upsert that increments the
//! cached `time_spent`, latches `completed`, bumps `last_accessed`, and
//! appends to the session log -- all in one transaction on the serialized
//! connection, so concurrent reports for the same key cannot lose updates.

use rusqlite::params;
use vidya_core::VidyaError;

use crate::database::{Database, map_tr_err};
use crate::models::{ProgressRecord, ProgressWithSessions, StudySession};

/// One time-report delta.
#[derive(Debug, Clone)]
pub struct ReportTime {
    pub user_id: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub chapter_id: i64,
    pub chapter_name: String,
    /// Minutes, fractional. Callers must only pass positive deltas.
    pub delta_minutes: f64,
    /// Cumulative minutes at which `completed` latches.
    pub threshold_minutes: f64,
    /// RFC 3339 timestamp of the report.
    pub recorded_at: String,
}

const PROGRESS_COLUMNS: &str = "id, user_id, subject_id, subject_name, chapter_id, \
     chapter_name, time_spent, completed, last_accessed, created_at";

fn map_progress_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRecord> {
    Ok(ProgressRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        subject_name: row.get(3)?,
        chapter_id: row.get(4)?,
        chapter_name: row.get(5)?,
        time_spent: row.get(6)?,
        completed: row.get(7)?,
        last_accessed: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Apply one positive time delta to the (user, subject, chapter) record,
/// creating it if absent, and append the delta to the session log.
///
/// `completed` only ever transitions false -> true: the update keeps the
/// existing flag whenever the new cumulative total is below the threshold.
pub async fn report_time(db: &Database, report: ReportTime) -> Result<ProgressRecord, VidyaError> {
    let new_id = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO progress (id, user_id, subject_id, subject_name, chapter_id,
                                       chapter_name, time_spent, completed, last_accessed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                         CASE WHEN ?7 >= ?8 THEN 1 ELSE 0 END, ?9, ?9)
                 ON CONFLICT (user_id, subject_id, chapter_id) DO UPDATE SET
                     time_spent = progress.time_spent + excluded.time_spent,
                     completed = CASE
                         WHEN progress.time_spent + excluded.time_spent >= ?8 THEN 1
                         ELSE progress.completed
                     END,
                     subject_name = excluded.subject_name,
                     chapter_name = excluded.chapter_name,
                     last_accessed = excluded.last_accessed",
                params![
                    new_id,
                    report.user_id,
                    report.subject_id,
                    report.subject_name,
                    report.chapter_id,
                    report.chapter_name,
                    report.delta_minutes,
                    report.threshold_minutes,
                    report.recorded_at,
                ],
            )?;

            let record = tx.query_row(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM progress
                     WHERE user_id = ?1 AND subject_id = ?2 AND chapter_id = ?3"
                ),
                params![report.user_id, report.subject_id, report.chapter_id],
                map_progress_row,
            )?;

            tx.execute(
                "INSERT INTO study_sessions (progress_id, started_at, duration)
                 VALUES (?1, ?2, ?3)",
                params![record.id, report.recorded_at, report.delta_minutes],
            )?;

            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// All progress records for a user, most recently accessed first.
pub async fn get_user_progress(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ProgressRecord>, VidyaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress
                 WHERE user_id = ?1 ORDER BY last_accessed DESC"
            ))?;
            let records = stmt
                .query_map(params![user_id], map_progress_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Progress records for one subject of a user.
pub async fn get_subject_progress(
    db: &Database,
    user_id: &str,
    subject_id: i64,
) -> Result<Vec<ProgressRecord>, VidyaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress
                 WHERE user_id = ?1 AND subject_id = ?2"
            ))?;
            let records = stmt
                .query_map(params![user_id, subject_id], map_progress_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Records touched since `since` (by `last_accessed`), each with its full
/// session log. Pre-filter for analytics; exact window inclusion is decided
/// per session entry by the aggregation.
pub async fn get_progress_with_sessions_since(
    db: &Database,
    user_id: &str,
    since: &str,
) -> Result<Vec<ProgressWithSessions>, VidyaError> {
    let user_id = user_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress
                 WHERE user_id = ?1 AND last_accessed >= ?2
                 ORDER BY last_accessed DESC"
            ))?;
            let records = stmt
                .query_map(params![user_id, since], map_progress_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut sess_stmt = conn.prepare(
                "SELECT progress_id, started_at, duration FROM study_sessions
                 WHERE progress_id = ?1 ORDER BY started_at ASC",
            )?;
            let mut out = Vec::with_capacity(records.len());
            for record in records {
                let sessions = sess_stmt
                    .query_map(params![record.id], |row| {
                        Ok(StudySession {
                            progress_id: row.get(0)?,
                            started_at: row.get(1)?,
                            duration: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                out.push(ProgressWithSessions { record, sessions });
            }
            Ok(out)
        })
        .await
        .map_err(map_tr_err)
}
