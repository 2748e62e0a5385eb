// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vidya backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Vidya configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to values
/// suitable for local development.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VidyaConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token signing and password settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Direct LLM (Ollama) provider settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// RAG microservice settings.
    #[serde(default)]
    pub rag: RagConfig,

    /// Study-progress settings.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Syllabus reference data settings.
    #[serde(default)]
    pub syllabus: SyllabusConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens. Must be set for production
    /// deployments; the default is only acceptable for local development.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,

    /// Token lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

fn default_token_secret() -> String {
    "dev-only-secret".to_string()
}

fn default_token_ttl_days() -> u32 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "vidya.db".to_string()
}

/// Ollama provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API.
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model identifier passed on every chat call.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Deadline for chat calls, in seconds.
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            chat_timeout_secs: default_chat_timeout_secs(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_chat_timeout_secs() -> u64 {
    60
}

/// RAG microservice configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Whether the RAG provider participates in the fallback chain at all.
    #[serde(default = "default_rag_enabled")]
    pub enabled: bool,

    /// Base URL of the RAG service.
    #[serde(default = "default_rag_base_url")]
    pub base_url: String,

    /// Deadline for the health probe, in seconds.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// Deadline for chat calls, in seconds.
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    /// Deadline for document ingestion, in seconds.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: default_rag_enabled(),
            base_url: default_rag_base_url(),
            health_timeout_secs: default_health_timeout_secs(),
            chat_timeout_secs: default_chat_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}

fn default_rag_enabled() -> bool {
    true
}

fn default_rag_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_health_timeout_secs() -> u64 {
    5
}

fn default_upload_timeout_secs() -> u64 {
    120
}

/// Study-progress configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    /// Cumulative minutes after which a chapter counts as completed.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold_minutes: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            completion_threshold_minutes: default_completion_threshold(),
        }
    }
}

fn default_completion_threshold() -> f64 {
    2.0
}

/// Syllabus reference data configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyllabusConfig {
    /// Optional path to a TOML file overriding the embedded syllabus.
    #[serde(default)]
    pub path: Option<String>,
}
