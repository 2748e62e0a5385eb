// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-facing Server-Sent-Events chat streaming.
//!
//! Wire contract, one `data: <json>` frame per event:
//! `{"chunk": "...", "done": false}` for each increment, then exactly one of
//! `{"chunk": "", "done": true, "sessionId": "...", "fullResponse": "..."}`
//! or `{"error": "...", "done": true}`.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::Extension;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures::{Stream, StreamExt};
use vidya_relay::RelayEvent;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::chat::SendMessageRequest;
use crate::server::AppState;

fn event_payload(event: RelayEvent) -> serde_json::Value {
    match event {
        RelayEvent::Chunk(chunk) => serde_json::json!({
            "chunk": chunk,
            "done": false,
        }),
        RelayEvent::Done {
            session_id,
            full_response,
        } => serde_json::json!({
            "chunk": "",
            "done": true,
            "sessionId": session_id,
            "fullResponse": full_response,
        }),
        RelayEvent::Error(error) => serde_json::json!({
            "error": error,
            "done": true,
        }),
    }
}

fn to_sse_event(event: RelayEvent) -> Event {
    Event::default().data(event_payload(event).to_string())
}

/// POST /api/chat/stream
pub async fn stream_message(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let stream = state
        .relay
        .respond_stream(
            &user_id,
            body.session_id.as_deref(),
            &body.message,
            &body.language,
        )
        .await?;

    let events = stream.map(|event| Ok(to_sse_event(event)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
