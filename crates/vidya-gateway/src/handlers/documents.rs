// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document upload proxy to the RAG ingestion endpoint.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::{info, warn};
use vidya_core::VidyaError;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentResponse {
    pub success: bool,
    /// False when the RAG service was unreachable: the upload is accepted
    /// but its content will not inform replies until re-uploaded.
    pub indexed: bool,
    pub num_chunks: u32,
    pub message: String,
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// POST /api/documents/upload (multipart, field `document` or `file`)
pub async fn upload(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadDocumentResponse>, ApiError> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VidyaError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default();
        if name != "document" && name != "file" {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| VidyaError::Validation("file name is required".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| VidyaError::Validation(format!("failed to read upload: {e}")))?;
        upload = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let Some((file_name, content_type, bytes)) = upload else {
        return Err(VidyaError::Validation("no file uploaded".to_string()).into());
    };

    let extension = extension_of(&file_name).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(VidyaError::Validation(
            "only PDF and Word documents are allowed".to_string(),
        )
        .into());
    }

    info!(user_id, file_name, size = bytes.len(), "document upload received");

    match state.rag.upload(&file_name, &content_type, bytes).await {
        Ok(result) => Ok(Json(UploadDocumentResponse {
            success: true,
            indexed: true,
            num_chunks: result.num_chunks,
            message: result.message,
        })),
        Err(e) => {
            // Ingestion is best-effort: the RAG service being down should
            // not fail the user's upload flow.
            warn!(user_id, %e, "rag ingestion unavailable, document not indexed");
            Ok(Json(UploadDocumentResponse {
                success: true,
                indexed: false,
                num_chunks: 0,
                message: "document received, but the retrieval service is \
                          unavailable; it was not indexed"
                    .to_string(),
            }))
        }
    }
}
