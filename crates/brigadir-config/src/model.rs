// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Brigadir dispatch bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The admin allowlist and the per-city topic
//! routing table are fixed at startup and injected into the engine and
//! relay; nothing reads them as ambient globals.

use std::collections::BTreeMap;

use brigadir_core::City;
use serde::{Deserialize, Serialize};

/// Top-level Brigadir configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only `telegram.bot_token` is required to actually serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrigadirConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Admin access settings.
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "brigadir".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` means the bot cannot serve.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Shared group chat for order announcements. `0` disables
    /// announcements entirely.
    #[serde(default)]
    pub group_chat_id: i64,

    /// City key -> topic thread id inside the shared group chat.
    /// Cities without an entry (or with thread `0`) are not announced.
    #[serde(default = "default_city_topics")]
    pub city_topics: BTreeMap<String, i32>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            group_chat_id: 0,
            city_topics: default_city_topics(),
        }
    }
}

impl TelegramConfig {
    /// Topic thread for announcing orders in the given city.
    ///
    /// `None` when no group chat is configured or the city has no
    /// (non-zero) thread entry.
    pub fn topic_thread(&self, city: City) -> Option<i32> {
        if self.group_chat_id == 0 {
            return None;
        }
        self.city_topics
            .get(&city.to_string())
            .copied()
            .filter(|thread| *thread != 0)
    }
}

fn default_city_topics() -> BTreeMap<String, i32> {
    BTreeMap::from([
        ("moscow".to_string(), 7),
        ("spb".to_string(), 11),
        ("novosibirsk".to_string(), 4),
        ("chelyabinsk".to_string(), 21),
        ("ufa".to_string(), 13),
        ("kazan".to_string(), 15),
        ("omsk".to_string(), 17),
        ("krasnoyarsk".to_string(), 19),
        ("nizhny_novgorod".to_string(), 23),
        ("voronezh".to_string(), 9),
    ])
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("brigadir").join("brigadir.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("brigadir.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Admin access configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Telegram ids granted admin access regardless of stored role.
    #[serde(default)]
    pub allowlist: Vec<i64>,
}

impl AdminConfig {
    /// Whether the given Telegram id is on the admin allowlist.
    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.allowlist.contains(&telegram_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_cities() {
        let config = TelegramConfig::default();
        for city in [
            City::Moscow,
            City::Spb,
            City::Novosibirsk,
            City::Chelyabinsk,
            City::Ufa,
            City::Kazan,
            City::Omsk,
            City::Krasnoyarsk,
            City::NizhnyNovgorod,
            City::Voronezh,
        ] {
            assert!(config.city_topics.contains_key(&city.to_string()));
        }
    }

    #[test]
    fn topic_thread_requires_group_chat() {
        let mut config = TelegramConfig::default();
        assert_eq!(config.topic_thread(City::Moscow), None);

        config.group_chat_id = -1001234567890;
        assert_eq!(config.topic_thread(City::Moscow), Some(7));
    }

    #[test]
    fn zero_thread_means_unrouted() {
        let mut config = TelegramConfig::default();
        config.group_chat_id = -100;
        config.city_topics.insert("moscow".to_string(), 0);
        assert_eq!(config.topic_thread(City::Moscow), None);
    }

    #[test]
    fn allowlist_membership() {
        let admin = AdminConfig {
            allowlist: vec![100, 200],
        };
        assert!(admin.is_admin(100));
        assert!(!admin.is_admin(300));
    }

    #[test]
    fn unknown_section_key_rejected() {
        let toml_str = r#"
[bot]
name = "test"
unknown_key = 1
"#;
        assert!(toml::from_str::<BrigadirConfig>(toml_str).is_err());
    }
}
