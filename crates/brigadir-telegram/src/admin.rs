// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin command implementations.
//!
//! Every handler is gated on the admin allowlist or a stored admin role.
//! Argument strings are tokenized here; malformed input gets a format
//! hint and nothing is applied.

use std::str::FromStr;

use brigadir_core::{OrderStatus, Role};
use brigadir_orders::{analytics, export};
use brigadir_storage::queries::{orders, users};
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};

use crate::commands::reply;
use crate::context::AppContext;
use crate::text;

const DEFAULT_LIMIT: i64 = 20;

/// Parse and clamp a limit argument.
fn parse_limit(raw: &str, default: i64) -> i64 {
    raw.parse::<i64>().map(|v| v.clamp(1, 200)).unwrap_or(default)
}

/// Admin gate; replies and returns `false` when access is denied.
async fn require_admin(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<bool> {
    match ctx.is_admin(telegram_id).await {
        Ok(true) => Ok(true),
        Ok(false) => {
            reply(bot, msg, "Нет доступа.").await?;
            Ok(false)
        }
        Err(e) => {
            reply(bot, msg, &text::user_message(&e)).await?;
            Ok(false)
        }
    }
}

pub async fn panel(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }
    reply(bot, msg, text::admin_usage()).await
}

pub async fn stats(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }
    match analytics::overview(ctx.engine.database()).await {
        Ok(snapshot) => reply(bot, msg, &text::stats_report(&snapshot)).await,
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn city_stats(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }
    match analytics::overview(ctx.engine.database()).await {
        Ok(snapshot) if snapshot.by_city.is_empty() => {
            reply(bot, msg, "По городам пока нет данных.").await
        }
        Ok(snapshot) => {
            let mut lines = vec!["Статистика по городам:".to_string()];
            for (city, count) in &snapshot.by_city {
                lines.push(format!("- {}: {count}", city.label()));
            }
            reply(bot, msg, &lines.join("\n")).await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn orders_list(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let mut status = None;
    if let Some(&raw) = parts.first() {
        let raw = raw.to_lowercase();
        if raw != "all" {
            match OrderStatus::from_str(&raw) {
                Ok(parsed) => status = Some(parsed),
                Err(_) => {
                    return reply(
                        bot,
                        msg,
                        "Статус неизвестен. Используйте: all, created, published, assigned, in_progress, completed, cancelled.",
                    )
                    .await;
                }
            }
        }
    }
    let limit = parts
        .get(1)
        .map(|raw| parse_limit(raw, DEFAULT_LIMIT))
        .unwrap_or(DEFAULT_LIMIT);

    match orders::list_recent(ctx.engine.database(), status, limit).await {
        Ok(recent) => {
            let title = format!("Последние заявки (до {limit}):");
            reply(bot, msg, &text::orders_list(&recent, &title)).await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn order_detail(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let [raw_id] = parts.as_slice() else {
        return reply(bot, msg, "Формат: /order [id]").await;
    };
    let Ok(order_id) = raw_id.parse::<i64>() else {
        return reply(bot, msg, "id должен быть числом.").await;
    };

    match ctx.engine.get(order_id).await {
        Ok(Some(order)) => reply(bot, msg, &text::order_detail(&order)).await,
        Ok(None) => reply(bot, msg, "Заявка не найдена.").await,
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn set_status(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let [raw_id, raw_status] = parts.as_slice() else {
        return reply(
            bot,
            msg,
            "Формат: /set_status [order_id] [created|published|assigned|in_progress|completed|cancelled]",
        )
        .await;
    };
    let Ok(order_id) = raw_id.parse::<i64>() else {
        return reply(bot, msg, "order_id должен быть числом.").await;
    };
    let Ok(status) = OrderStatus::from_str(&raw_status.to_lowercase()) else {
        return reply(bot, msg, "Неизвестный статус.").await;
    };

    match ctx.engine.force_status(order_id, status).await {
        Ok(order) => {
            reply(
                bot,
                msg,
                &format!("Заявка #{}: статус обновлен на {}.", order.id, order.status),
            )
            .await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn reassign(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let [raw_id, raw_master] = parts.as_slice() else {
        return reply(bot, msg, "Формат: /reassign [order_id] [master_tg_id|none]").await;
    };
    let Ok(order_id) = raw_id.parse::<i64>() else {
        return reply(bot, msg, "order_id должен быть числом.").await;
    };

    if raw_master.eq_ignore_ascii_case("none") {
        return match ctx.engine.unassign(order_id).await {
            Ok(_) => {
                reply(
                    bot,
                    msg,
                    &format!("Заявка #{order_id}: мастер снят, статус -> published."),
                )
                .await
            }
            Err(e) => reply(bot, msg, &text::user_message(&e)).await,
        };
    }

    let Ok(master_id) = raw_master.parse::<i64>() else {
        return reply(bot, msg, "master_tg_id должен быть числом или none.").await;
    };

    match ctx.engine.reassign(order_id, master_id).await {
        Ok(_) => {
            reply(
                bot,
                msg,
                &format!("Заявка #{order_id}: назначен мастер {master_id}, статус -> assigned."),
            )
            .await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn users_list(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();

    let mut role = None;
    if let Some(&raw) = parts.first() {
        let raw = raw.to_lowercase();
        if raw != "all" {
            match Role::from_str(&raw) {
                Ok(parsed) => role = Some(parsed),
                Err(_) => {
                    return reply(bot, msg, "Роль должна быть: all, admin, manager или master.")
                        .await;
                }
            }
        }
    }

    let mut active = None;
    if let Some(&raw) = parts.get(1) {
        match raw.to_lowercase().as_str() {
            "active" => active = Some(true),
            "inactive" => active = Some(false),
            "all" => {}
            _ => {
                return reply(bot, msg, "Активность должна быть: all, active или inactive.")
                    .await;
            }
        }
    }

    let limit = parts
        .get(2)
        .map(|raw| parse_limit(raw, DEFAULT_LIMIT))
        .unwrap_or(DEFAULT_LIMIT);

    let db = ctx.engine.database();
    let listing = async {
        let listed = users::list_users(db, role, active, limit).await?;
        let total = users::count_users(db).await?;
        let by_role = users::count_by_role(db).await?;
        Ok::<_, brigadir_core::BrigadirError>((listed, total, by_role))
    }
    .await;

    match listing {
        Ok((listed, total, by_role)) => {
            let title = format!("Пользователи (до {limit}):");
            reply(bot, msg, &text::users_list(&listed, total, &by_role, &title)).await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn set_role(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let [raw_id, raw_role] = parts.as_slice() else {
        return reply(bot, msg, "Формат: /set_role [telegram_id] [admin|manager|master]").await;
    };
    let Ok(target_id) = raw_id.parse::<i64>() else {
        return reply(bot, msg, "telegram_id должен быть числом.").await;
    };
    let Ok(role) = Role::from_str(&raw_role.to_lowercase()) else {
        return reply(bot, msg, "Роль должна быть admin, manager или master.").await;
    };

    match users::set_role(ctx.engine.database(), target_id, role).await {
        Ok(user) => {
            reply(
                bot,
                msg,
                &format!("Роль {role} назначена пользователю {}.", user.telegram_id),
            )
            .await
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn set_active(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let [raw_id, raw_mode] = parts.as_slice() else {
        return reply(bot, msg, "Формат: /set_active [telegram_id] [on|off]").await;
    };
    let Ok(target_id) = raw_id.parse::<i64>() else {
        return reply(bot, msg, "telegram_id должен быть числом.").await;
    };
    let is_active = match raw_mode.to_lowercase().as_str() {
        "on" => true,
        "off" => false,
        _ => return reply(bot, msg, "Используйте on или off.").await,
    };

    match users::set_active(ctx.engine.database(), target_id, is_active).await {
        Ok(Some(user)) => {
            reply(
                bot,
                msg,
                &format!(
                    "Пользователь {}: active={}.",
                    user.telegram_id,
                    if user.is_active { "yes" } else { "no" }
                ),
            )
            .await
        }
        Ok(None) => reply(bot, msg, "Пользователь не найден.").await,
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn broadcast(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }

    let Some((raw_role, body)) = args.trim().split_once(char::is_whitespace) else {
        return reply(bot, msg, "Формат: /broadcast [role|all] [текст]").await;
    };
    let body = body.trim();
    if body.is_empty() {
        return reply(bot, msg, "Текст рассылки не должен быть пустым.").await;
    }

    let raw_role = raw_role.to_lowercase();
    let mut role = None;
    if raw_role != "all" {
        match Role::from_str(&raw_role) {
            Ok(parsed) => role = Some(parsed),
            Err(_) => {
                return reply(bot, msg, "Роль должна быть: all, admin, manager или master.")
                    .await;
            }
        }
    }

    // Active users only; a broadcast never resurrects disabled accounts.
    let recipients = match users::list_users(ctx.engine.database(), role, Some(true), 5000).await {
        Ok(listed) => listed.into_iter().map(|u| u.telegram_id).collect::<Vec<_>>(),
        Err(e) => return reply(bot, msg, &text::user_message(&e)).await,
    };
    if recipients.is_empty() {
        return reply(bot, msg, "Нет получателей для рассылки.").await;
    }

    let report = ctx.relay.broadcast(&recipients, body).await;
    reply(
        bot,
        msg,
        &format!(
            "Рассылка завершена. Успешно: {}, ошибок: {}, целевая роль: {raw_role}.",
            report.sent, report.failed
        ),
    )
    .await
}

pub async fn export_basic(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }
    match export::export_basic(ctx.engine.database()).await {
        Ok(data) => {
            let file = InputFile::memory(data).file_name("orders_basic.csv");
            bot.send_document(msg.chat.id, file).await?;
            Ok(())
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

pub async fn export_full(
    bot: &Bot,
    msg: &Message,
    telegram_id: i64,
    ctx: &AppContext,
) -> ResponseResult<()> {
    if !require_admin(bot, msg, telegram_id, ctx).await? {
        return Ok(());
    }
    match export::export_full(ctx.engine.database()).await {
        Ok(data) => {
            let file = InputFile::memory(data).file_name("orders_full.csv");
            bot.send_document(msg.chat.id, file).await?;
            Ok(())
        }
        Err(e) => reply(bot, msg, &text::user_message(&e)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(parse_limit("50", 20), 50);
        assert_eq!(parse_limit("0", 20), 1);
        assert_eq!(parse_limit("9999", 20), 200);
        assert_eq!(parse_limit("abc", 20), 20);
    }

    #[test]
    fn role_and_status_tokens_parse_case_insensitively() {
        assert_eq!(Role::from_str("master").unwrap(), Role::Master);
        assert_eq!(
            OrderStatus::from_str("in_progress").unwrap(),
            OrderStatus::InProgress
        );
        assert!(Role::from_str("boss").is_err());
    }
}
