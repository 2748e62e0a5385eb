// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chapter lock state and completion percentage, derived on every read.

use serde::Serialize;
use vidya_storage::ProgressRecord;
use vidya_syllabus::Subject;

/// Cumulative minutes after which a chapter counts as completed, unless
/// overridden in config.
pub const DEFAULT_COMPLETION_THRESHOLD_MINUTES: f64 = 2.0;

/// One chapter as presented to the client: syllabus data joined with the
/// caller's progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub chapter_id: i64,
    pub chapter_name: String,
    pub description: Option<String>,
    /// Zero-based position within the subject; determines unlock order.
    pub position: usize,
    pub time_spent: f64,
    pub completed: bool,
    /// 100 iff completed; otherwise capped at 99 so "almost done" stays
    /// visually distinct from "done".
    pub progress_percent: u8,
    pub is_locked: bool,
}

/// Completion percentage for a chapter.
pub fn progress_percent(time_spent: f64, completed: bool, threshold: f64) -> u8 {
    if completed {
        100
    } else {
        ((time_spent / threshold).min(0.99) * 100.0).floor() as u8
    }
}

/// Derive the view for every chapter of `subject`, in syllabus order.
///
/// The first chapter is always unlocked; chapter i unlocks only once the
/// record for chapter i-1 exists and is completed. Never cached -- the
/// caller recomputes on each read.
pub fn compute_chapter_view(
    subject: &Subject,
    records: &[ProgressRecord],
    threshold: f64,
) -> Vec<ChapterView> {
    let find = |chapter_id: i64| records.iter().find(|r| r.chapter_id == chapter_id);

    subject
        .chapters
        .iter()
        .enumerate()
        .map(|(position, chapter)| {
            let record = find(chapter.id);
            let time_spent = record.map(|r| r.time_spent).unwrap_or(0.0);
            let completed = record.map(|r| r.completed).unwrap_or(false);

            let is_locked = if position == 0 {
                false
            } else {
                let previous = &subject.chapters[position - 1];
                !find(previous.id).map(|r| r.completed).unwrap_or(false)
            };

            ChapterView {
                chapter_id: chapter.id,
                chapter_name: chapter.name.clone(),
                description: chapter.description.clone(),
                position,
                time_spent,
                completed,
                progress_percent: progress_percent(time_spent, completed, threshold),
                is_locked,
            }
        })
        .collect()
}
