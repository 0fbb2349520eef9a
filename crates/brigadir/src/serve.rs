// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brigadir serve` command implementation.
//!
//! Opens the SQLite store (running migrations), builds the lifecycle
//! engine and the Telegram relay, and hands control to the teloxide
//! dispatcher until Ctrl-C.

use std::sync::Arc;

use brigadir_config::model::BrigadirConfig;
use brigadir_core::BrigadirError;
use brigadir_orders::OrderEngine;
use brigadir_storage::Database;
use brigadir_telegram::context::AppContext;
use brigadir_telegram::relay::TelegramRelay;
use teloxide::Bot;
use tracing::info;

/// Runs the `brigadir serve` command.
pub async fn run_serve(config: BrigadirConfig) -> Result<(), BrigadirError> {
    init_tracing(&config.bot.log_level);

    info!(name = config.bot.name.as_str(), "starting brigadir serve");

    let Some(token) = config.telegram.bot_token.clone() else {
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in brigadir.toml \
             or the BRIGADIR_TELEGRAM_BOT_TOKEN environment variable."
        );
        return Err(BrigadirError::Config(
            "telegram.bot_token is required to serve".into(),
        ));
    };

    let db = Database::open_with(&config.storage).await?;
    info!(
        path = config.storage.database_path.as_str(),
        "storage initialized"
    );

    let engine = OrderEngine::new(db.clone());
    let bot = Bot::new(token);
    let relay = TelegramRelay::new(bot.clone(), config.telegram.clone());

    if config.telegram.group_chat_id == 0 {
        info!("no group chat configured, orders will not be announced");
    } else {
        info!(
            group_chat_id = config.telegram.group_chat_id,
            cities = config.telegram.city_topics.len(),
            "group announcements enabled"
        );
    }
    if config.admin.allowlist.is_empty() {
        info!("admin allowlist is empty, admin access is role-based only");
    }

    let ctx = Arc::new(AppContext::new(engine, relay, config.admin.clone()));

    brigadir_telegram::run_dispatcher(bot, ctx).await;

    db.close().await?;
    info!("brigadir serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brigadir={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
