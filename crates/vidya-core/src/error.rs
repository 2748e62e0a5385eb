// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vidya education backend.

use thiserror::Error;

/// Classifies provider failures so callers can pick a matching
/// user-facing degradation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// TCP connect failed -- the service process is not running.
    ConnectionRefused,
    /// The upstream answered 404 for the requested model.
    ModelNotFound,
    /// The bounded call deadline elapsed.
    Timeout,
    /// Any other upstream failure (non-2xx, malformed body, mid-stream error).
    Upstream,
}

/// The primary error type used across all Vidya crates.
#[derive(Debug, Error)]
pub enum VidyaError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Inference provider errors (RAG service or Ollama unavailable or failing).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        kind: ProviderErrorKind,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested entity does not exist (or is not visible to the caller).
    #[error("not found: {0}")]
    NotFound(String),

    /// Authentication or token verification failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request payload failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VidyaError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>, kind: ProviderErrorKind) -> Self {
        VidyaError::Provider {
            message: message.into(),
            kind,
            source: None,
        }
    }

    /// The provider failure classification, if this is a provider error.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            VidyaError::Provider { kind, .. } => Some(*kind),
            VidyaError::Timeout { .. } => Some(ProviderErrorKind::Timeout),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_classification() {
        let err = VidyaError::provider("refused", ProviderErrorKind::ConnectionRefused);
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::ConnectionRefused));

        let timeout = VidyaError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        assert_eq!(timeout.provider_kind(), Some(ProviderErrorKind::Timeout));

        assert_eq!(VidyaError::NotFound("x".into()).provider_kind(), None);
    }

    #[test]
    fn display_includes_message() {
        let err = VidyaError::provider("model llama3.2 missing", ProviderErrorKind::ModelNotFound);
        assert!(err.to_string().contains("model llama3.2 missing"));
    }
}
