// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects every failure instead of stopping at the first.

use std::str::FromStr;

use brigadir_core::City;

use crate::diagnostic::ConfigError;
use crate::model::BrigadirConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &BrigadirConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.bot.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bot.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level must be one of trace, debug, info, warn, error; got `{}`",
                config.bot.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Every topic-routing key must name a known city.
    for key in config.telegram.city_topics.keys() {
        if City::from_str(key).is_err() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.city_topics contains unknown city key `{key}`"),
            });
        }
    }

    for id in &config.admin.allowlist {
        if *id <= 0 {
            errors.push(ConfigError::Validation {
                message: format!("admin.allowlist entries must be positive Telegram ids, got {id}"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
