// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress routes: time reports, reads, chapter views, analytics.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use vidya_core::VidyaError;
use vidya_progress::{ChapterView, MonthlyReport, TimeReport, WeeklyReport};
use vidya_storage::ProgressRecord;
use vidya_storage::queries::users;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub subject_id: i64,
    #[serde(default)]
    pub subject_name: String,
    pub chapter_id: i64,
    #[serde(default)]
    pub chapter_name: String,
    /// Minutes, fractional. Every call adds a new delta; the endpoint is
    /// deliberately not idempotent.
    pub time_spent: f64,
}

#[derive(Debug, Serialize)]
pub struct UpdateProgressResponse {
    pub success: bool,
    pub progress: Option<ProgressRecord>,
}

/// POST /api/progress/update
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(body): Json<UpdateProgressRequest>,
) -> Result<Json<UpdateProgressResponse>, ApiError> {
    let progress = state
        .tracker
        .report_time(
            &user_id,
            TimeReport {
                subject_id: body.subject_id,
                subject_name: body.subject_name,
                chapter_id: body.chapter_id,
                chapter_name: body.chapter_name,
                delta_minutes: body.time_spent,
            },
        )
        .await?;
    Ok(Json(UpdateProgressResponse {
        success: true,
        progress,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProgressListResponse {
    pub success: bool,
    pub progress: Vec<ProgressRecord>,
}

/// GET /api/progress/user
pub async fn user_progress(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<ProgressListResponse>, ApiError> {
    let progress = state.tracker.user_progress(&user_id).await?;
    Ok(Json(ProgressListResponse {
        success: true,
        progress,
    }))
}

/// GET /api/progress/subject/{subject_id}
pub async fn subject_progress(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(subject_id): Path<i64>,
) -> Result<Json<ProgressListResponse>, ApiError> {
    let progress = state.tracker.subject_progress(&user_id, subject_id).await?;
    Ok(Json(ProgressListResponse {
        success: true,
        progress,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterViewResponse {
    pub success: bool,
    pub subject_id: i64,
    pub subject_name: String,
    pub chapters: Vec<ChapterView>,
}

/// GET /api/progress/chapters/{subject_id}
///
/// Joins the caller's class syllabus with their progress; lock state and
/// percentages are derived fresh on every call.
pub async fn chapter_views(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(subject_id): Path<i64>,
) -> Result<Json<ChapterViewResponse>, ApiError> {
    let user = users::get_user_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| VidyaError::NotFound("user".to_string()))?;
    let subject = state
        .syllabus
        .subject(&user.class_name, subject_id)
        .ok_or_else(|| VidyaError::NotFound("subject".to_string()))?;
    let chapters = state
        .tracker
        .chapter_view(&user_id, &user.class_name, subject_id)
        .await?;
    Ok(Json(ChapterViewResponse {
        success: true,
        subject_id,
        subject_name: subject.name.clone(),
        chapters,
    }))
}

#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    pub success: bool,
    pub analytics: WeeklyReport,
}

/// GET /api/progress/analytics/weekly
pub async fn weekly_analytics(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<WeeklyResponse>, ApiError> {
    let analytics = state
        .tracker
        .weekly_analytics(&user_id, chrono::Utc::now())
        .await?;
    Ok(Json(WeeklyResponse {
        success: true,
        analytics,
    }))
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    pub success: bool,
    pub analytics: MonthlyReport,
}

/// GET /api/progress/analytics/monthly
pub async fn monthly_analytics(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<MonthlyResponse>, ApiError> {
    let analytics = state
        .tracker
        .monthly_analytics(&user_id, chrono::Utc::now())
        .await?;
    Ok(Json(MonthlyResponse {
        success: true,
        analytics,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_accepts_fractional_minutes() {
        let req: UpdateProgressRequest = serde_json::from_str(
            r#"{"subjectId":1,"subjectName":"Mathematics","chapterId":2,"chapterName":"Fractions","timeSpent":0.75}"#,
        )
        .unwrap();
        assert_eq!(req.subject_id, 1);
        assert_eq!(req.chapter_id, 2);
        assert!((req.time_spent - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn update_request_requires_ids_and_time() {
        let result: Result<UpdateProgressRequest, _> =
            serde_json::from_str(r#"{"subjectName":"Math"}"#);
        assert!(result.is_err());
    }
}
