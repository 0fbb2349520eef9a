// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot command surface and dispatch.
//!
//! Commands with free-form arguments capture the rest of the line as a
//! single string; the admin module tokenizes and validates it, replying
//! with a format hint when the input is malformed.

use std::sync::Arc;

use brigadir_core::Role;
use brigadir_storage::queries::{orders, users};
use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};
use teloxide::utils::command::BotCommands;

use crate::context::AppContext;
use crate::{admin, flow, text};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    Start,
    Help,
    /// Manager panel.
    Manager,
    /// Start the guided order form.
    NewOrder,
    MyOrders,
    /// Personal stats for managers and masters.
    MyStats,
    /// Master panel.
    Profile,
    MyJobs,
    /// Admin panel with usage.
    Admin,
    Stats,
    CityStats,
    Orders(String),
    Order(String),
    SetStatus(String),
    Reassign(String),
    Users(String),
    SetRole(String),
    SetActive(String),
    Broadcast(String),
    ExportBasic,
    ExportFull,
}

/// Send a plain HTML-mode reply into the message's chat.
pub(crate) async fn reply(bot: &Bot, msg: &Message, text: &str) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let telegram_id = from.id.0 as i64;

    match cmd {
        Command::Start => start(&bot, &msg, telegram_id, &ctx).await,
        Command::Help => {
            reply(
                &bot,
                &msg,
                "Справка:\n/manager - панель менеджера\n/profile - профиль мастера\n/admin - админ-панель",
            )
            .await
        }
        Command::Manager => manager_panel(&bot, &msg, telegram_id, &ctx).await,
        Command::NewOrder => flow::start_order_flow(&bot, &msg, telegram_id, &ctx).await,
        Command::MyOrders => my_orders(&bot, &msg, telegram_id, &ctx).await,
        Command::MyStats => my_stats(&bot, &msg, telegram_id, &ctx).await,
        Command::Profile => master_panel(&bot, &msg, telegram_id, &ctx).await,
        Command::MyJobs => my_jobs(&bot, &msg, telegram_id, &ctx).await,
        Command::Admin => admin::panel(&bot, &msg, telegram_id, &ctx).await,
        Command::Stats => admin::stats(&bot, &msg, telegram_id, &ctx).await,
        Command::CityStats => admin::city_stats(&bot, &msg, telegram_id, &ctx).await,
        Command::Orders(args) => admin::orders_list(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::Order(args) => admin::order_detail(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::SetStatus(args) => admin::set_status(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::Reassign(args) => admin::reassign(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::Users(args) => admin::users_list(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::SetRole(args) => admin::set_role(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::SetActive(args) => admin::set_active(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::Broadcast(args) => admin::broadcast(&bot, &msg, telegram_id, &ctx, &args).await,
        Command::ExportBasic => admin::export_basic(&bot, &msg, telegram_id, &ctx).await,
        Command::ExportFull => admin::export_full(&bot, &msg, telegram_id, &ctx).await,
    }
}

async fn start(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if ctx.admin.is_admin(telegram_id) {
        // Allowlisted accounts get the admin role on first contact.
        if let Err(e) =
            users::ensure_user(ctx.engine.database(), telegram_id, Some(Role::Admin)).await
        {
            return reply(bot, msg, &text::user_message(&e)).await;
        }
        return reply(
            bot,
            msg,
            "Привет! Доступ администратора подтвержден. Используй /admin.",
        )
        .await;
    }

    if let Err(e) = ctx.touch_user(telegram_id).await {
        return reply(bot, msg, &text::user_message(&e)).await;
    }
    reply(
        bot,
        msg,
        "Привет! Используй /manager или /profile в зависимости от роли.",
    )
    .await
}

async fn manager_panel(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    match ctx.is_manager(telegram_id).await {
        Ok(true) => {
            reply(
                bot,
                msg,
                "Панель менеджера:\n/new_order - создать заявку\n/my_orders - мои заявки\n/my_stats - моя статистика",
            )
            .await
        }
        Ok(false) => reply(bot, msg, "Нет доступа. Роль менеджера не назначена.").await,
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

async fn my_orders(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    match ctx.is_manager(telegram_id).await {
        Ok(true) => {}
        Ok(false) => return reply(bot, msg, "Нет доступа. Роль менеджера не назначена.").await,
        Err(e) => return reply(bot, msg, &text::user_message(&e)).await,
    }

    match orders::list_by_manager(ctx.engine.database(), telegram_id).await {
        Ok(all) => {
            let recent = &all[all.len().saturating_sub(20)..];
            reply(bot, msg, &text::orders_list(recent, "Мои заявки:")).await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

async fn my_stats(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    // Masters see their job stats; managers (and admins) their orders.
    let is_master = match ctx.is_master(telegram_id).await {
        Ok(v) => v,
        Err(e) => return reply(bot, msg, &text::user_message(&e)).await,
    };
    let result = if is_master {
        brigadir_orders::analytics::master_totals(ctx.engine.database(), telegram_id).await
    } else {
        match ctx.is_manager(telegram_id).await {
            Ok(true) => {
                brigadir_orders::analytics::manager_totals(ctx.engine.database(), telegram_id)
                    .await
            }
            Ok(false) => return reply(bot, msg, "Нет доступа. Роль не назначена.").await,
            Err(e) => return reply(bot, msg, &text::user_message(&e)).await,
        }
    };

    match result {
        Ok((total, completed)) => {
            reply(
                bot,
                msg,
                &format!("Моя статистика:\nВсего заявок: {total}\nЗавершено: {completed}"),
            )
            .await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

async fn master_panel(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    match ctx.is_master(telegram_id).await {
        Ok(true) => {
            reply(
                bot,
                msg,
                "Профиль мастера\n/my_jobs - мои заказы\n/my_stats - моя статистика",
            )
            .await
        }
        Ok(false) => reply(bot, msg, "Нет доступа. Роль мастера не назначена.").await,
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

async fn my_jobs(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    match ctx.is_master(telegram_id).await {
        Ok(true) => {}
        Ok(false) => return reply(bot, msg, "Нет доступа. Роль мастера не назначена.").await,
        Err(e) => return reply(bot, msg, &text::user_message(&e)).await,
    }

    match orders::list_by_master(ctx.engine.database(), telegram_id).await {
        Ok(all) => {
            let recent = &all[all.len().saturating_sub(20)..];
            reply(bot, msg, &text::orders_list(recent, "Ваши последние заказы:")).await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_command_names_parse() {
        assert_eq!(
            Command::parse("/new_order", "brigadir").unwrap(),
            Command::NewOrder
        );
        assert_eq!(
            Command::parse("/my_stats", "brigadir").unwrap(),
            Command::MyStats
        );
        assert_eq!(
            Command::parse("/export_basic", "brigadir").unwrap(),
            Command::ExportBasic
        );
    }

    #[test]
    fn argument_commands_capture_the_rest_of_line() {
        assert_eq!(
            Command::parse("/set_status 5 cancelled", "brigadir").unwrap(),
            Command::SetStatus("5 cancelled".to_string())
        );
        assert_eq!(
            Command::parse("/broadcast master Завтра планерка", "brigadir").unwrap(),
            Command::Broadcast("master Завтра планерка".to_string())
        );
        assert_eq!(
            Command::parse("/orders", "brigadir").unwrap(),
            Command::Orders(String::new())
        );
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(Command::parse("/fire_everyone", "brigadir").is_err());
    }
}
