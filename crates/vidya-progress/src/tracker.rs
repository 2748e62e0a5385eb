// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration over storage, syllabus, and the pure calculators.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};
use vidya_core::VidyaError;
use vidya_storage::queries::{chat, progress};
use vidya_storage::{Database, ProgressRecord};
use vidya_syllabus::Syllabus;

use crate::analytics::{MonthlyReport, WeeklyReport, monthly_report, weekly_report};
use crate::view::{ChapterView, compute_chapter_view};

/// One inbound time report from the client.
#[derive(Debug, Clone)]
pub struct TimeReport {
    pub subject_id: i64,
    pub subject_name: String,
    pub chapter_id: i64,
    pub chapter_name: String,
    /// Minutes, fractional.
    pub delta_minutes: f64,
}

/// Progress tracking service: records time reports and derives chapter
/// views and analytics from them.
pub struct ProgressTracker {
    db: Arc<Database>,
    syllabus: Arc<Syllabus>,
    threshold_minutes: f64,
}

impl ProgressTracker {
    pub fn new(db: Arc<Database>, syllabus: Arc<Syllabus>, threshold_minutes: f64) -> Self {
        Self {
            db,
            syllabus,
            threshold_minutes,
        }
    }

    /// Record a time delta for a chapter.
    ///
    /// Zero and negative deltas are a no-op (`None`): the client's periodic
    /// save timer can fire without accumulated time, and such reports must
    /// not touch `last_accessed` or the session log.
    pub async fn report_time(
        &self,
        user_id: &str,
        report: TimeReport,
    ) -> Result<Option<ProgressRecord>, VidyaError> {
        if report.delta_minutes <= 0.0 {
            debug!(user_id, delta = report.delta_minutes, "ignoring non-positive time report");
            return Ok(None);
        }

        let record = progress::report_time(
            &self.db,
            progress::ReportTime {
                user_id: user_id.to_string(),
                subject_id: report.subject_id,
                subject_name: report.subject_name,
                chapter_id: report.chapter_id,
                chapter_name: report.chapter_name,
                delta_minutes: report.delta_minutes,
                threshold_minutes: self.threshold_minutes,
                recorded_at: vidya_storage::now_rfc3339(),
            },
        )
        .await?;

        if record.completed {
            info!(
                user_id,
                subject_id = record.subject_id,
                chapter_id = record.chapter_id,
                time_spent = record.time_spent,
                "chapter completed"
            );
        }
        Ok(Some(record))
    }

    /// All progress records for a user, most recent first.
    pub async fn user_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, VidyaError> {
        progress::get_user_progress(&self.db, user_id).await
    }

    /// Progress records for one subject.
    pub async fn subject_progress(
        &self,
        user_id: &str,
        subject_id: i64,
    ) -> Result<Vec<ProgressRecord>, VidyaError> {
        progress::get_subject_progress(&self.db, user_id, subject_id).await
    }

    /// Chapter views (lock state + percentage) for one subject of the
    /// caller's class. Recomputed on every call.
    pub async fn chapter_view(
        &self,
        user_id: &str,
        class_name: &str,
        subject_id: i64,
    ) -> Result<Vec<ChapterView>, VidyaError> {
        let subject = self
            .syllabus
            .subject(class_name, subject_id)
            .ok_or_else(|| {
                VidyaError::NotFound(format!("subject {subject_id} in {class_name}"))
            })?;
        let records = progress::get_subject_progress(&self.db, user_id, subject_id).await?;
        Ok(compute_chapter_view(subject, &records, self.threshold_minutes))
    }

    /// Trailing-week analytics.
    pub async fn weekly_analytics(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<WeeklyReport, VidyaError> {
        let since = (now - chrono::Duration::days(7)).to_rfc3339_opts(SecondsFormat::Millis, true);
        let entries =
            progress::get_progress_with_sessions_since(&self.db, user_id, &since).await?;
        Ok(weekly_report(&entries, now))
    }

    /// Trailing-month analytics, including the tutor-query tally.
    pub async fn monthly_analytics(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MonthlyReport, VidyaError> {
        let since = (now - chrono::Duration::days(30)).to_rfc3339_opts(SecondsFormat::Millis, true);
        let entries =
            progress::get_progress_with_sessions_since(&self.db, user_id, &since).await?;
        let queries = chat::count_user_messages_since(&self.db, user_id, &since).await?;
        Ok(monthly_report(&entries, now, queries))
    }
}
