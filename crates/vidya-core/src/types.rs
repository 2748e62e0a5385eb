// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Vidya workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by provider health probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Provider is fully operational.
    Healthy,
    /// Provider is operational but experiencing issues.
    Degraded(String),
    /// Provider is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Whether this status allows routing a chat request to the provider.
    pub fn is_usable(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded(_))
    }
}

/// Who authored a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of conversation history, in wire shape for providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// A request handed to an inference provider.
///
/// Providers consume what they understand: the RAG service takes the raw
/// `message` plus `language` and does its own prompting; the direct LLM
/// path takes `system_prompt` and `history` (which already includes the
/// current message as its final turn).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
    pub system_prompt: Option<String>,
    pub language: String,
}

/// A complete (non-streamed) provider reply.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    /// Provider-supplied spoken-audio reference, when available.
    pub audio_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_as_lowercase() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::from_str("assistant").unwrap(), Role::Assistant);
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn role_serde_matches_wire_format() {
        let turn = ChatTurn {
            role: Role::User,
            content: "hi".into(),
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let back: ChatTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::User);
    }

    #[test]
    fn degraded_status_is_usable() {
        assert!(HealthStatus::Healthy.is_usable());
        assert!(HealthStatus::Degraded("slow".into()).is_usable());
        assert!(!HealthStatus::Unhealthy("down".into()).is_usable());
    }
}
