// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of the loaded configuration.

use crate::model::VidyaConfig;

/// A single actionable configuration problem.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{key}: {message}")]
pub struct ConfigError {
    /// Dotted config key the problem refers to.
    pub key: String,
    /// Human-readable description of what is wrong.
    pub message: String,
}

impl ConfigError {
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Validate constraints that the type system cannot express.
///
/// Collects every problem instead of stopping at the first so operators can
/// fix a config file in one pass.
pub fn validate_config(config: &VidyaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigError::new("server.port", "must be non-zero"));
    }

    if config.auth.token_secret.is_empty() {
        errors.push(ConfigError::new("auth.token_secret", "must not be empty"));
    }

    if config.auth.token_ttl_days == 0 {
        errors.push(ConfigError::new("auth.token_ttl_days", "must be at least 1"));
    }

    if config.storage.database_path.is_empty() {
        errors.push(ConfigError::new("storage.database_path", "must not be empty"));
    }

    for (key, url) in [
        ("ollama.base_url", &config.ollama.base_url),
        ("rag.base_url", &config.rag.base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ConfigError::new(key, format!("not an http(s) URL: {url}")));
        }
    }

    if config.ollama.model.is_empty() {
        errors.push(ConfigError::new("ollama.model", "must not be empty"));
    }

    if config.progress.completion_threshold_minutes <= 0.0 {
        errors.push(ConfigError::new(
            "progress.completion_threshold_minutes",
            "must be positive",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
