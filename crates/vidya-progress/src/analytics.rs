// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bucketed study analytics.
//!
//! The session log is the source of truth: every in-window session delta is
//! attributed to the bucket of its own timestamp. Records written before the
//! session log existed carry an empty log; for those the whole cached
//! `time_spent` is attributed to the `last_accessed` bucket. That fallback is
//! an approximation (the true distribution of old time is unknowable) and is
//! applied ONLY when the log is empty, never in addition to it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;
use vidya_storage::ProgressWithSessions;

/// Day labels in week order, Monday first.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Per-subject activity within a window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectActivity {
    pub name: String,
    pub time_spent: f64,
    pub topics_completed: u32,
    pub total_topics: u32,
    /// round(topics_completed / total_topics * 100), 0 when no topics.
    pub proficiency: u32,
}

/// Result of one bucketed aggregation pass.
#[derive(Debug, Clone)]
pub struct PeriodAggregate<B: Ord> {
    /// Minutes per bucket. Only buckets that received time are present.
    pub buckets: BTreeMap<B, f64>,
    /// All in-window minutes, independent of bucket membership.
    pub total_minutes: f64,
    /// Per-subject activity, keyed by subject name.
    pub subjects: BTreeMap<String, SubjectActivity>,
    /// Distinct calendar days with at least one in-window session.
    pub active_days: BTreeSet<NaiveDate>,
}

fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            warn!(value, %err, "skipping unparsable timestamp in analytics");
            None
        }
    }
}

/// Sum in-window session durations into buckets chosen by `bucket_fn`.
///
/// Topic tallies (`topics_completed` / `total_topics`) count each record once
/// per subject that saw activity in the window, independent of how much time
/// landed in which bucket.
pub fn aggregate_by_period<B, F>(
    entries: &[ProgressWithSessions],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    bucket_fn: F,
) -> PeriodAggregate<B>
where
    B: Ord,
    F: Fn(DateTime<Utc>) -> B,
{
    let mut aggregate = PeriodAggregate {
        buckets: BTreeMap::new(),
        total_minutes: 0.0,
        subjects: BTreeMap::new(),
        active_days: BTreeSet::new(),
    };

    for entry in entries {
        let mut touched = false;
        let add = |aggregate: &mut PeriodAggregate<B>, ts: DateTime<Utc>, duration: f64| {
            *aggregate.buckets.entry(bucket_fn(ts)).or_insert(0.0) += duration;
            aggregate.total_minutes += duration;
            aggregate.active_days.insert(ts.date_naive());
            let subject = aggregate
                .subjects
                .entry(entry.record.subject_name.clone())
                .or_insert_with(|| SubjectActivity {
                    name: entry.record.subject_name.clone(),
                    time_spent: 0.0,
                    topics_completed: 0,
                    total_topics: 0,
                    proficiency: 0,
                });
            subject.time_spent += duration;
        };

        if !entry.sessions.is_empty() {
            for session in &entry.sessions {
                let Some(ts) = parse_ts(&session.started_at) else {
                    continue;
                };
                if ts >= window_start && ts <= window_end {
                    add(&mut aggregate, ts, session.duration);
                    touched = true;
                }
            }
        } else {
            // Legacy record without a session log: attribute the whole
            // cached total to the last_accessed bucket.
            if let Some(ts) = parse_ts(&entry.record.last_accessed) {
                if ts >= window_start && ts <= window_end {
                    add(&mut aggregate, ts, entry.record.time_spent);
                    touched = true;
                }
            }
        }

        if touched {
            let subject = aggregate
                .subjects
                .get_mut(&entry.record.subject_name)
                .expect("touched implies subject entry");
            subject.total_topics += 1;
            if entry.record.completed {
                subject.topics_completed += 1;
            }
        }
    }

    for subject in aggregate.subjects.values_mut() {
        subject.proficiency = if subject.total_topics == 0 {
            0
        } else {
            (subject.topics_completed as f64 / subject.total_topics as f64 * 100.0).round() as u32
        };
    }

    aggregate
}

/// One day's minutes in the weekly report, in Mon..Sun order.
#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub day: &'static str,
    pub minutes: f64,
}

/// Trailing-week analytics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// Whole minutes studied this week.
    pub total_time: i64,
    pub daily_data: Vec<DayBucket>,
    pub subject_progress: Vec<SubjectActivity>,
}

/// Aggregate the trailing 7 days into weekday buckets.
pub fn weekly_report(entries: &[ProgressWithSessions], now: DateTime<Utc>) -> WeeklyReport {
    let window_start = now - chrono::Duration::days(7);
    let aggregate = aggregate_by_period(entries, window_start, now, |ts| {
        ts.weekday().num_days_from_monday() as usize
    });

    let daily_data = WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, day)| DayBucket {
            day,
            minutes: aggregate.buckets.get(&i).copied().unwrap_or(0.0),
        })
        .collect();

    WeeklyReport {
        total_time: aggregate.total_minutes.round() as i64,
        daily_data,
        subject_progress: aggregate.subjects.into_values().collect(),
    }
}

/// Trailing-month analytics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    /// Whole hours studied this month.
    pub total_time: i64,
    /// Minutes beyond the whole hours.
    pub total_minutes: i64,
    /// Exact minutes for clients that want to format themselves.
    pub total_minutes_spent: f64,
    /// Completed chapters among records touched in the window.
    pub chapters_completed: u32,
    /// round(active_days / 30 * 100).
    pub consistency: u32,
    /// The user's own chat messages sent within the window.
    pub ai_tutor_queries: i64,
    /// Minutes per trailing week, oldest first (index 3 is the current week).
    pub weekly_data: [f64; 4],
    pub subject_growth: Vec<SubjectActivity>,
}

/// Aggregate the trailing 30 days into four week buckets.
///
/// Sessions 28-30 days old fall outside the four week slots but still count
/// toward the totals and active days.
pub fn monthly_report(
    entries: &[ProgressWithSessions],
    now: DateTime<Utc>,
    ai_tutor_queries: i64,
) -> MonthlyReport {
    let window_start = now - chrono::Duration::days(30);
    let aggregate = aggregate_by_period(entries, window_start, now, move |ts| {
        (now.signed_duration_since(ts).num_days() / 7) as usize
    });

    let mut weekly_data = [0.0; 4];
    for (weeks_ago, minutes) in &aggregate.buckets {
        if *weeks_ago < 4 {
            weekly_data[3 - weeks_ago] = *minutes;
        }
    }

    let chapters_completed = entries.iter().filter(|e| e.record.completed).count() as u32;
    let consistency = (aggregate.active_days.len() as f64 / 30.0 * 100.0).round() as u32;

    MonthlyReport {
        total_time: (aggregate.total_minutes / 60.0).floor() as i64,
        total_minutes: (aggregate.total_minutes % 60.0).round() as i64,
        total_minutes_spent: aggregate.total_minutes,
        chapters_completed,
        consistency,
        ai_tutor_queries,
        weekly_data,
        subject_growth: aggregate.subjects.into_values().collect(),
    }
}
