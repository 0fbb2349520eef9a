// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guided-form flow, photo capture, and master claim handlers.
//!
//! Button steps edit the prompt message in place; free-text steps reply
//! with the next prompt. Confirm tears the session down whether or not
//! the downstream persist/announce succeeds, and the announce result is
//! reported as published / saved-but-not-published.

use std::sync::Arc;

use brigadir_core::PhotoKind;
use brigadir_orders::{FormStep, OrderForm};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, Message, MessageId, ParseMode};
use tracing::warn;

use crate::callback::CallbackAction;
use crate::commands::reply;
use crate::context::AppContext;
use crate::{keyboards, text};

/// The inline keyboard a form step renders with, if any. Free-text
/// steps prompt without one.
fn keyboard_for(step: FormStep) -> Option<InlineKeyboardMarkup> {
    match step {
        FormStep::City => Some(keyboards::city_keyboard()),
        FormStep::Date => Some(keyboards::date_keyboard()),
        FormStep::CleaningType => Some(keyboards::cleaning_type_keyboard()),
        FormStep::Equipment => Some(keyboards::equipment_keyboard()),
        FormStep::Conditions => Some(keyboards::conditions_keyboard()),
        FormStep::Comment => Some(keyboards::skip_keyboard()),
        FormStep::Confirm => Some(keyboards::confirm_keyboard()),
        FormStep::Time | FormStep::Address | FormStep::ClientContact => None,
    }
}

/// The largest variant's file id of a photo message.
pub fn photo_file_id(msg: &Message) -> Option<String> {
    msg.photo()
        .and_then(|sizes| sizes.last())
        .map(|size| size.file.id.to_string())
}

/// `/new_order`: start a fresh form session for the chat.
pub async fn start_order_flow(
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

    let chat_id = msg.chat.id.0;
    ctx.sessions.begin(chat_id);
    let sent = bot
        .send_message(msg.chat.id, text::step_prompt(FormStep::City))
        .reply_markup(keyboards::city_keyboard())
        .await?;
    ctx.sessions
        .update(chat_id, |form| form.prompt_message_id = Some(sent.id.0));
    Ok(())
}

/// Free text and photos: feed the active form or capture session.
pub async fn handle_message(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> ResponseResult<()> {
    if msg.from.is_none() {
        return Ok(());
    }
    let chat_id = msg.chat.id.0;

    // An active photo capture swallows the message first.
    if let Some((order_id, kind)) = ctx.captures.target(chat_id) {
        let Some(file_id) = photo_file_id(&msg) else {
            return reply(&bot, &msg, "Нужно отправить фото.").await;
        };
        return match ctx.engine.add_photo(order_id, &file_id, kind).await {
            Ok(_) => reply(&bot, &msg, "Фото сохранено.").await,
            Err(e) => reply(&bot, &msg, &text::user_message(&e)).await,
        };
    }

    let Some(input) = msg.text().map(|t| t.trim().to_string()) else {
        return Ok(());
    };
    let Some(step) = ctx.sessions.update(chat_id, |form| form.step()) else {
        return Ok(());
    };

    // Only the free-text steps consume messages; button steps ignore
    // stray text and keep their prompt.
    let applied = match step {
        FormStep::Date => ctx.sessions.update(chat_id, |form| form.set_date(input)),
        FormStep::Time => ctx.sessions.update(chat_id, |form| form.set_time(input)),
        FormStep::Address => ctx.sessions.update(chat_id, |form| form.set_address(input)),
        FormStep::Comment => ctx.sessions.update(chat_id, |form| form.set_comment(input)),
        FormStep::ClientContact => ctx
            .sessions
            .update(chat_id, |form| form.set_client_contact(input)),
        _ => return Ok(()),
    };

    match applied {
        Some(Ok(())) => prompt_current_step(&bot, &msg, &ctx, chat_id).await,
        Some(Err(e)) => reply(&bot, &msg, &text::user_message(&e)).await,
        None => Ok(()),
    }
}

/// Send the prompt for the session's current step as a new message.
async fn prompt_current_step(
    bot: &Bot,
    msg: &Message,
    ctx: &AppContext,
    chat_id: i64,
) -> ResponseResult<()> {
    let Some((step, summary)) = ctx
        .sessions
        .update(chat_id, |form| (form.step(), text::form_summary(form)))
    else {
        return Ok(());
    };

    let prompt = if step == FormStep::Confirm {
        summary
    } else {
        text::step_prompt(step).to_string()
    };

    let request = bot.send_message(msg.chat.id, prompt).parse_mode(ParseMode::Html);
    let sent = match keyboard_for(step) {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    ctx.sessions
        .update(chat_id, |form| form.prompt_message_id = Some(sent.id.0));
    Ok(())
}

/// All button presses.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        return answer_alert(&bot, &q, "Неизвестное действие.").await;
    };
    let actor_id = q.from.id.0 as i64;

    match action {
        CallbackAction::City(_)
        | CallbackAction::DateToday
        | CallbackAction::DateTomorrow
        | CallbackAction::DateManual
        | CallbackAction::CleaningType(_)
        | CallbackAction::Equipment(_)
        | CallbackAction::Conditions(_)
        | CallbackAction::FlowBack
        | CallbackAction::FlowCancel
        | CallbackAction::FlowSkip
        | CallbackAction::FlowConfirm => handle_form_action(&bot, &q, &ctx, actor_id, action).await,
        CallbackAction::Respond(order_id) => respond(&bot, &q, &ctx, actor_id, order_id).await,
        CallbackAction::Accept(order_id) => accept(&bot, &q, &ctx, actor_id, order_id).await,
        CallbackAction::Decline(order_id) => decline(&bot, &q, &ctx, actor_id, order_id).await,
        CallbackAction::PhotoBefore(order_id) => {
            begin_capture(&bot, &q, &ctx, actor_id, order_id, PhotoKind::Before).await
        }
        CallbackAction::PhotoAfter(order_id) => {
            begin_capture(&bot, &q, &ctx, actor_id, order_id, PhotoKind::After).await
        }
        CallbackAction::Finish(order_id) => finish(&bot, &q, &ctx, actor_id, order_id).await,
    }
}

async fn answer(bot: &Bot, q: &CallbackQuery) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

async fn answer_text(bot: &Bot, q: &CallbackQuery, text: &str) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).text(text).await?;
    Ok(())
}

async fn answer_alert(bot: &Bot, q: &CallbackQuery, text: &str) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone())
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

/// Chat and message of the pressed button, for in-place edits.
fn pressed_message(q: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    q.message.as_ref().map(|m| (m.chat().id, m.id()))
}

async fn edit(
    bot: &Bot,
    chat: ChatId,
    message_id: MessageId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let request = bot
        .edit_message_text(chat, message_id, text)
        .parse_mode(ParseMode::Html);
    match keyboard {
        Some(keyboard) => {
            request.reply_markup(keyboard).await?;
        }
        None => {
            request.await?;
        }
    }
    Ok(())
}

async fn edit_step(
    bot: &Bot,
    chat: ChatId,
    message_id: MessageId,
    step: FormStep,
) -> ResponseResult<()> {
    edit(
        bot,
        chat,
        message_id,
        text::step_prompt(step),
        keyboard_for(step),
    )
    .await
}

async fn handle_form_action(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    action: CallbackAction,
) -> ResponseResult<()> {
    let Some((chat, message_id)) = pressed_message(q) else {
        return answer_alert(bot, q, "Сообщение недоступно.").await;
    };
    let chat_id = chat.0;

    if !ctx.sessions.contains(chat_id) {
        return answer_alert(bot, q, "Нет активной заявки. Используйте /new_order.").await;
    }

    match action {
        CallbackAction::FlowCancel => {
            ctx.sessions.take(chat_id);
            ctx.captures.end(chat_id);
            edit(bot, chat, message_id, "Сценарий отменен.", None).await?;
            return answer(bot, q).await;
        }
        CallbackAction::FlowBack => {
            let previous = ctx.sessions.update(chat_id, |form| form.go_back()).flatten();
            match previous {
                Some(step) => edit_step(bot, chat, message_id, step).await?,
                None => edit(bot, chat, message_id, "Нечего откатывать.", None).await?,
            }
            return answer(bot, q).await;
        }
        CallbackAction::FlowConfirm => return confirm_order(bot, q, ctx, actor_id, chat).await,
        _ => {}
    }

    // Field-setting actions: apply, then re-render the prompt in place.
    let applied = ctx.sessions.update(chat_id, |form| match action {
        CallbackAction::City(city) => form.set_city(city),
        CallbackAction::DateToday => form.set_date(OrderForm::date_today()),
        CallbackAction::DateTomorrow => form.set_date(OrderForm::date_tomorrow()),
        CallbackAction::DateManual => Ok(()),
        CallbackAction::CleaningType(kind) => form.set_cleaning_type(kind),
        CallbackAction::Equipment(option) => form.set_equipment(option),
        CallbackAction::Conditions(terms) => form.set_conditions(terms),
        CallbackAction::FlowSkip => form.skip_comment(),
        _ => Ok(()),
    });

    match applied {
        Some(Ok(())) => {
            if action == CallbackAction::DateManual {
                // Stay on the date step, switch to free-text entry.
                edit(bot, chat, message_id, "Введите дату (дд.мм.гггг):", None).await?;
            } else {
                let step = ctx
                    .sessions
                    .update(chat_id, |form| form.step())
                    .unwrap_or(FormStep::City);
                edit_step(bot, chat, message_id, step).await?;
            }
            answer(bot, q).await
        }
        Some(Err(e)) => answer_alert(bot, q, &text::user_message(&e)).await,
        None => answer_alert(bot, q, "Нет активной заявки. Используйте /new_order.").await,
    }
}

/// Persist and announce a confirmed form.
///
/// The session is cleared before the persist attempt; publishing is
/// best-effort and a failed announcement leaves the order published
/// without a group message.
async fn confirm_order(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    chat: ChatId,
) -> ResponseResult<()> {
    let Some((_, message_id)) = pressed_message(q) else {
        return answer_alert(bot, q, "Сообщение недоступно.").await;
    };
    let Some(form) = ctx.sessions.take(chat.0) else {
        return answer_alert(bot, q, "Нет активной заявки. Используйте /new_order.").await;
    };

    let new_order = match form.confirm(actor_id) {
        Ok(new_order) => new_order,
        Err(e) => {
            edit(bot, chat, message_id, &text::user_message(&e), None).await?;
            return answer(bot, q).await;
        }
    };

    let order = match ctx.engine.publish(&new_order).await {
        Ok(order) => order,
        Err(e) => {
            edit(bot, chat, message_id, &text::user_message(&e), None).await?;
            return answer(bot, q).await;
        }
    };

    let announced = ctx
        .relay
        .announce(
            order.city,
            &text::order_brief(&order),
            keyboards::group_response_keyboard(order.id),
        )
        .await;

    let outcome = match announced {
        Ok(Some(_)) => format!("Заявка #{} опубликована.", order.id),
        Ok(None) => format!("Заявка #{} создана, но не опубликована.", order.id),
        Err(e) => {
            warn!(order_id = order.id, error = %e, "announcement failed after publish");
            format!("Заявка #{} создана, но не опубликована.", order.id)
        }
    };
    edit(bot, chat, message_id, &outcome, None).await?;
    answer(bot, q).await
}

/// Master presses "respond" under a group announcement.
async fn respond(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    order_id: i64,
) -> ResponseResult<()> {
    match ctx.is_master(actor_id).await {
        Ok(true) => {}
        Ok(false) => return answer_alert(bot, q, "Нет доступа.").await,
        Err(e) => return answer_alert(bot, q, &text::user_message(&e)).await,
    }

    let order = match ctx.engine.claim(order_id, actor_id).await {
        Ok(order) => order,
        Err(e) => return answer_alert(bot, q, &text::user_message(&e)).await,
    };

    // The claim is committed; a failed DM is a partial success.
    let dm = format!(
        "Вы откликнулись.\n\n{}\n{}",
        text::order_full(&order),
        text::manager_contact(order.manager_id)
    );
    if let Err(e) = ctx
        .relay
        .direct_message(
            actor_id,
            &dm,
            Some(keyboards::master_accept_keyboard(order.id)),
        )
        .await
    {
        warn!(order_id, master_id = actor_id, error = %e, "claim DM failed");
    }

    answer_text(bot, q, "Отклик принят.").await
}

async fn accept(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    order_id: i64,
) -> ResponseResult<()> {
    let order = match ctx.engine.accept(order_id, actor_id).await {
        Ok(order) => order,
        Err(e) => return answer_alert(bot, q, &text::user_message(&e)).await,
    };
    if let Some((chat, message_id)) = pressed_message(q) {
        edit(
            bot,
            chat,
            message_id,
            &format!("Заявка #{} в работе.\nЗагрузите фото ДО и ПОСЛЕ.", order.id),
            Some(keyboards::photo_actions_keyboard(order.id)),
        )
        .await?;
    }
    answer(bot, q).await
}

async fn decline(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    order_id: i64,
) -> ResponseResult<()> {
    if let Err(e) = ctx.engine.decline(order_id, actor_id).await {
        return answer_alert(bot, q, &text::user_message(&e)).await;
    }
    if let Some((chat, message_id)) = pressed_message(q) {
        edit(
            bot,
            chat,
            message_id,
            "Вы отказались от заявки. Она снова доступна.",
            None,
        )
        .await?;
    }
    answer(bot, q).await
}

async fn begin_capture(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    order_id: i64,
    kind: PhotoKind,
) -> ResponseResult<()> {
    // Only the assigned master may attach photos.
    match ctx.engine.get(order_id).await {
        Ok(Some(order)) if order.master_id == Some(actor_id) => {}
        Ok(_) => return answer_alert(bot, q, "Заявка не найдена или недоступна.").await,
        Err(e) => return answer_alert(bot, q, &text::user_message(&e)).await,
    }

    let Some((chat, _)) = pressed_message(q) else {
        return answer_alert(bot, q, "Сообщение недоступно.").await;
    };
    ctx.captures.begin(chat.0, order_id, kind);

    let prompt = match kind {
        PhotoKind::Before => "Отправьте фото ДО (минимум 1).",
        PhotoKind::After => "Отправьте фото ПОСЛЕ (минимум 1).",
    };
    bot.send_message(chat, prompt).await?;
    answer(bot, q).await
}

async fn finish(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    actor_id: i64,
    order_id: i64,
) -> ResponseResult<()> {
    let order = match ctx.engine.finish(order_id, actor_id).await {
        Ok(order) => order,
        Err(e) => return answer_alert(bot, q, &text::user_message(&e)).await,
    };
    if let Some((chat, message_id)) = pressed_message(q) {
        ctx.captures.end(chat.0);
        edit(
            bot,
            chat,
            message_id,
            &format!("Заявка #{} завершена.", order.id),
            None,
        )
        .await?;
    }
    answer(bot, q).await
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a private-chat message from JSON matching the Bot API shape.
    fn make_text_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_photo_message(user_id: u64) -> Message {
        let json = serde_json::json!({
            "message_id": 2,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "photo": [
                {
                    "file_id": "small-id",
                    "file_unique_id": "u1",
                    "width": 90,
                    "height": 90,
                    "file_size": 1000,
                },
                {
                    "file_id": "large-id",
                    "file_unique_id": "u2",
                    "width": 800,
                    "height": 800,
                    "file_size": 60000,
                },
            ],
        });
        serde_json::from_value(json).expect("failed to deserialize mock photo message")
    }

    #[test]
    fn photo_file_id_picks_the_largest_variant() {
        let msg = make_photo_message(42);
        assert_eq!(photo_file_id(&msg).as_deref(), Some("large-id"));
    }

    #[test]
    fn text_message_has_no_photo_id() {
        let msg = make_text_message(42, "hello");
        assert_eq!(photo_file_id(&msg), None);
    }

    #[test]
    fn free_text_steps_have_no_keyboard_and_button_steps_do() {
        assert!(keyboard_for(FormStep::Time).is_none());
        assert!(keyboard_for(FormStep::Address).is_none());
        assert!(keyboard_for(FormStep::ClientContact).is_none());
        assert!(keyboard_for(FormStep::City).is_some());
        assert!(keyboard_for(FormStep::Date).is_some());
        assert!(keyboard_for(FormStep::Comment).is_some());
        assert!(keyboard_for(FormStep::Confirm).is_some());
    }
}
