// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vidya.toml` > `~/.config/vidya/vidya.toml` >
//! `/etc/vidya/vidya.toml` with environment variable overrides via the
//! `VIDYA_` prefix.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VidyaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vidya/vidya.toml` (system-wide)
/// 3. `~/.config/vidya/vidya.toml` (user XDG config)
/// 4. `./vidya.toml` (local directory)
/// 5. `VIDYA_*` environment variables
pub fn load_config() -> Result<VidyaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VidyaConfig::default()))
        .merge(Toml::file("/etc/vidya/vidya.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vidya/vidya.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vidya.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<VidyaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VidyaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VidyaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VidyaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VIDYA_AUTH_TOKEN_SECRET` must map to
/// `auth.token_secret`, not `auth.token.secret`.
fn env_provider() -> Env {
    Env::prefixed("VIDYA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("ollama_", "ollama.", 1)
            .replacen("rag_", "rag.", 1)
            .replacen("progress_", "progress.", 1)
            .replacen("syllabus_", "syllabus.", 1);
        mapped.into()
    })
}
