// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./brigadir.toml` > `~/.config/brigadir/brigadir.toml`
//! > `/etc/brigadir/brigadir.toml` with environment variable overrides
//! via the `BRIGADIR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BrigadirConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/brigadir/brigadir.toml` (system-wide)
/// 3. `~/.config/brigadir/brigadir.toml` (user XDG config)
/// 4. `./brigadir.toml` (local directory)
/// 5. `BRIGADIR_*` environment variables
pub fn load_config() -> Result<BrigadirConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadirConfig::default()))
        .merge(Toml::file("/etc/brigadir/brigadir.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("brigadir/brigadir.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("brigadir.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BrigadirConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadirConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BrigadirConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadirConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BRIGADIR_TELEGRAM_GROUP_CHAT_ID`
/// must map to `telegram.group_chat_id`, not `telegram.group.chat.id`.
fn env_provider() -> Env {
    Env::prefixed("BRIGADIR_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BRIGADIR_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        // The section prefix must be matched at the start only:
        // `bot_` also occurs inside `telegram_bot_token`.
        let key_str = key.as_str();
        let mapped = if let Some(rest) = key_str.strip_prefix("telegram_") {
            format!("telegram.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("storage_") {
            format!("storage.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("admin_") {
            format!("admin.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("bot_") {
            format!("bot.{rest}")
        } else {
            key_str.to_string()
        };
        mapped.into()
    })
}
