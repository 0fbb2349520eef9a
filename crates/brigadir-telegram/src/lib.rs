// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram surface for the Brigadir dispatch bot.
//!
//! Wires teloxide long polling to the order lifecycle engine: command
//! handlers for the manager/master/admin panels, the guided order-form
//! flow, inline keyboards, HTML message formatting, and the
//! notification relay for group-topic announcements, direct messages,
//! and broadcasts.

pub mod admin;
pub mod callback;
pub mod commands;
pub mod context;
pub mod flow;
pub mod keyboards;
pub mod relay;
pub mod text;

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use crate::commands::Command;
use crate::context::AppContext;

/// Build the update dispatcher and run long polling until shutdown.
///
/// Branch order matters: commands parse first, then callback queries,
/// then free text and photos feeding the active form or capture session.
pub async fn run_dispatcher(bot: Bot, ctx: Arc<AppContext>) {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(commands::handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(flow::handle_callback))
        .branch(Update::filter_message().endpoint(flow::handle_message));

    info!("starting Telegram long polling");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
