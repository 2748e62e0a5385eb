// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit accumulator for client-side study timers.
//!
//! Embedders (a desktop shell, a test harness, a future native client) own
//! one accumulator per open chapter view: elapsed time collects in it, a
//! periodic task calls [`TimeAccumulator::flush`], and teardown calls
//! [`TimeAccumulator::close`] for the guaranteed final flush. Foreground
//! flushes propagate storage errors; the close-path flush is best-effort
//! and only logs, because the view is already gone.

use std::sync::Arc;

use tracing::warn;
use vidya_core::VidyaError;
use vidya_storage::ProgressRecord;

use crate::tracker::{ProgressTracker, TimeReport};

/// Accumulates elapsed study minutes for one (user, subject, chapter) and
/// flushes them as time-report deltas.
pub struct TimeAccumulator {
    tracker: Arc<ProgressTracker>,
    user_id: String,
    report: TimeReport,
    pending_minutes: f64,
}

impl TimeAccumulator {
    pub fn new(tracker: Arc<ProgressTracker>, user_id: &str, report: TimeReport) -> Self {
        Self {
            tracker,
            user_id: user_id.to_string(),
            report: TimeReport {
                delta_minutes: 0.0,
                ..report
            },
            pending_minutes: 0.0,
        }
    }

    /// Record elapsed time. Negative additions are ignored.
    pub fn add_minutes(&mut self, minutes: f64) {
        if minutes > 0.0 {
            self.pending_minutes += minutes;
        }
    }

    /// Minutes accumulated since the last flush.
    pub fn pending(&self) -> f64 {
        self.pending_minutes
    }

    /// Flush the accumulated time as one delta. A no-op when nothing is
    /// pending. Storage errors propagate and leave the accumulator intact
    /// so the time is retried on the next flush.
    pub async fn flush(&mut self) -> Result<Option<ProgressRecord>, VidyaError> {
        if self.pending_minutes <= 0.0 {
            return Ok(None);
        }
        let report = TimeReport {
            delta_minutes: self.pending_minutes,
            ..self.report.clone()
        };
        let record = self.tracker.report_time(&self.user_id, report).await?;
        self.pending_minutes = 0.0;
        Ok(record)
    }

    /// The guaranteed final flush on teardown. Best-effort: failures are
    /// logged and swallowed.
    pub async fn close(mut self) {
        if let Err(e) = self.flush().await {
            warn!(
                user_id = %self.user_id,
                subject_id = self.report.subject_id,
                chapter_id = self.report.chapter_id,
                %e,
                "final progress flush failed, dropping pending time"
            );
        }
    }
}
