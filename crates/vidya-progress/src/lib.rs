// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chapter unlock derivation and study-time analytics.
//!
//! The lock state and completion percentage are pure functions over the
//! stored progress records and the static syllabus; nothing derived is ever
//! cached. Analytics are bucketed sums over the append-only session log.

pub mod analytics;
pub mod reporter;
pub mod tracker;
pub mod view;

pub use analytics::{
    MonthlyReport, PeriodAggregate, SubjectActivity, WeeklyReport, aggregate_by_period,
    monthly_report, weekly_report,
};
pub use reporter::TimeAccumulator;
pub use tracker::{ProgressTracker, TimeReport};
pub use view::{
    ChapterView, DEFAULT_COMPLETION_THRESHOLD_MINUTES, compute_chapter_view, progress_percent,
};
