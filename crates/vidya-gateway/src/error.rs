// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from `VidyaError` to HTTP responses.
//!
//! Authorization failures on other users' resources surface as not-found,
//! never as permission-denied, so existence is not confirmed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use vidya_core::VidyaError;

/// Error body sent to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Wrapper making `VidyaError` usable as an axum rejection.
#[derive(Debug)]
pub struct ApiError(pub VidyaError);

impl From<VidyaError> for ApiError {
    fn from(err: VidyaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            VidyaError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            VidyaError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            VidyaError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            VidyaError::Timeout { .. } | VidyaError::Provider { .. } => {
                // Provider trouble that leaked this far is a server fault;
                // the relay normally degrades before reaching here.
                tracing::error!(error = %self.0, "provider error escaped to gateway");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream service failure".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
