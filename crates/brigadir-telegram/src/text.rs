// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message formatting.
//!
//! Everything renders for HTML parse mode; the only markup emitted is
//! the `tg://user` profile link, order fields are free text from the
//! manager and are not escaped beyond what Telegram tolerates in HTML
//! text nodes.

use brigadir_core::{BrigadirError, Order, OrderStatus, User};
use brigadir_orders::analytics::StatsOverview;
use brigadir_orders::OrderForm;
use tracing::error;

/// Clickable Telegram profile link for HTML parse mode.
pub fn user_link(telegram_id: Option<i64>, label: &str) -> String {
    match telegram_id {
        Some(id) => format!(r#"<a href="tg://user?id={id}">{label}</a>"#),
        None => "-".to_string(),
    }
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Short order text for the group announcement.
pub fn order_brief(order: &Order) -> String {
    format!(
        "Заявка #{}\nГород: {}\nДата: {} {}\nТип: {}\nОборудование: {}\nКомментарий: {}\n",
        order.id,
        order.city.label(),
        order.date,
        order.time,
        order.cleaning_type,
        order.equipment,
        dash_if_empty(&order.comment),
    )
}

/// Full order text for the assigned master's DM.
pub fn order_full(order: &Order) -> String {
    format!(
        "Заявка #{}\nГород: {}\nДата: {} {}\nАдрес: {}\nТип: {}\nОборудование: {}\nУсловия: {}\nКомментарий: {}\n",
        order.id,
        order.city.label(),
        order.date,
        order.time,
        order.address,
        order.cleaning_type,
        order.equipment,
        order.conditions,
        dash_if_empty(&order.comment),
    )
}

/// Manager contact line appended to the master's DM.
pub fn manager_contact(manager_id: i64) -> String {
    format!(
        "Контакт менеджера: {}",
        user_link(Some(manager_id), "написать менеджеру")
    )
}

/// Admin detail view of one order.
pub fn order_detail(order: &Order) -> String {
    format!(
        "Заявка #{}\nГород: {}\nАдрес: {}\nДата/время: {} {}\nТип: {}\nОборудование: {}\nУсловия: {}\nКомментарий: {}\nКонтакт клиента: {}\nКонтакт менеджера: {}\nМенеджер TG: {}\nМастер TG: {}\nСтатус: {}\nСоздана: {}",
        order.id,
        order.city.label(),
        order.address,
        order.date,
        order.time,
        order.cleaning_type,
        order.equipment,
        order.conditions,
        dash_if_empty(&order.comment),
        dash_if_empty(&order.client_contact),
        dash_if_empty(&order.manager_contact),
        order.manager_id,
        order
            .master_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        order.status,
        order.created_at,
    )
}

/// Compact one-line-per-order listing for admin output.
pub fn orders_list(orders: &[Order], title: &str) -> String {
    if orders.is_empty() {
        return "Заявки не найдены.".to_string();
    }
    let mut lines = vec![title.to_string()];
    for order in orders {
        lines.push(format!(
            "#{} | {} | {} {} | {} | mgr:{} | mst:{}",
            order.id,
            order.city.label(),
            order.date,
            order.time,
            order.status,
            order.manager_id,
            order
                .master_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    lines.join("\n")
}

/// Compact one-line-per-user listing for admin output.
pub fn users_list(users: &[User], total: i64, by_role: &[(String, i64)], title: &str) -> String {
    if users.is_empty() {
        return "Пользователи не найдены.".to_string();
    }
    let roles = by_role
        .iter()
        .map(|(role, count)| {
            let name = if role.is_empty() { "без роли" } else { role };
            format!("{name}={count}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        title.to_string(),
        format!("Всего в системе: {total}"),
        format!("По ролям: {roles}"),
    ];
    for user in users {
        lines.push(format!(
            "- tg:{} | role:{} | active:{} | city:{}",
            user.telegram_id,
            user.role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if user.is_active { "yes" } else { "no" },
            dash_if_empty(&user.city),
        ));
    }
    lines.join("\n")
}

/// The `/stats` report.
pub fn stats_report(snapshot: &StatsOverview) -> String {
    let mut out = format!("Всего заявок: {}\n", snapshot.total_orders);
    for (status, count) in &snapshot.by_status {
        let label = match status {
            OrderStatus::Created => "Создана",
            OrderStatus::Published => "Опубликована",
            OrderStatus::Assigned => "Назначена",
            OrderStatus::InProgress => "В процессе",
            OrderStatus::Completed => "Завершена",
            OrderStatus::Cancelled => "Отменена",
        };
        out.push_str(&format!("{label}: {count}\n"));
    }
    if !snapshot.by_city.is_empty() {
        out.push_str("\nТоп городов:\n");
        for (city, count) in snapshot.by_city.iter().take(5) {
            out.push_str(&format!("- {}: {count}\n", city.label()));
        }
    }
    if !snapshot.top_managers.is_empty() {
        out.push_str("\nТоп менеджеров:\n");
        for (id, count) in &snapshot.top_managers {
            out.push_str(&format!("- {id}: {count}\n"));
        }
    }
    if !snapshot.top_masters.is_empty() {
        out.push_str("\nТоп мастеров:\n");
        for (id, count) in &snapshot.top_masters {
            out.push_str(&format!("- {id}: {count}\n"));
        }
    }
    out
}

/// Confirmation summary shown before the form publishes.
pub fn form_summary(form: &OrderForm) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    format!(
        "Проверьте заявку:\nГород: {}\nДата: {} {}\nАдрес: {}\nТип: {}\nОборудование: {}\nУсловия: {}\nКомментарий: {}\nКонтакт клиента: {}\n",
        form.city.map(|c| c.label()).unwrap_or("-"),
        field(&form.date),
        field(&form.time),
        field(&form.address),
        field(&form.cleaning_type),
        field(&form.equipment),
        field(&form.conditions),
        dash_if_empty(&field(&form.comment)),
        field(&form.client_contact),
    )
}

/// The prompt shown when (re-)entering a form step.
pub fn step_prompt(step: brigadir_orders::FormStep) -> &'static str {
    use brigadir_orders::FormStep;
    match step {
        FormStep::City => "Выберите город:",
        FormStep::Date => "Выберите дату:",
        FormStep::Time => "Введите время (например 14:00):",
        FormStep::Address => "Введите адрес:",
        FormStep::CleaningType => "Выберите тип уборки:",
        FormStep::Equipment => "Оборудование:",
        FormStep::Conditions => "Условия:",
        FormStep::Comment => "Комментарий (можно пропустить):",
        FormStep::ClientContact => "Контакт клиента (только для менеджера/владельца):",
        FormStep::Confirm => "Проверьте заявку и подтвердите.",
    }
}

/// Admin command list shown by `/admin`.
pub fn admin_usage() -> &'static str {
    "Админ-панель:\n\
     /stats - общая аналитика\n\
     /city_stats - статистика по городам\n\
     /orders [status|all] [limit] - последние заявки\n\
     /order [id] - детальная заявка\n\
     /set_status [order_id] [status] - сменить статус\n\
     /reassign [order_id] [master_tg_id|none] - назначить/снять мастера\n\
     /users [role|all] [active|inactive|all] [limit] - пользователи\n\
     /set_role [telegram_id] [admin|manager|master] - назначить роль\n\
     /set_active [telegram_id] [on|off] - активировать/деактивировать\n\
     /broadcast [role|all] [текст] - рассылка пользователям\n\
     /export_basic - экспорт CSV (основной)\n\
     /export_full - экспорт CSV (полный)"
}

/// Map a domain error onto the reply the user sees.
///
/// Storage and internal failures are logged and collapsed into a
/// generic message; everything else carries its own wording.
pub fn user_message(err: &BrigadirError) -> String {
    match err {
        BrigadirError::OrderNotFound(_) => "Заявка не найдена.".to_string(),
        BrigadirError::UserNotFound(_) => "Пользователь не найден.".to_string(),
        BrigadirError::AlreadyTaken { .. } => "Заявка уже занята.".to_string(),
        BrigadirError::Unauthorized(_) => "Нет доступа.".to_string(),
        BrigadirError::Validation(message) => format!("Некорректный ввод: {message}"),
        BrigadirError::Delivery { .. } => {
            "Данные сохранены, но уведомление не доставлено.".to_string()
        }
        other => {
            error!(error = %other, "internal error surfaced to user");
            "Внутренняя ошибка. Попробуйте позже.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use brigadir_core::City;

    use super::*;

    fn make_order() -> Order {
        Order {
            id: 7,
            city: City::Moscow,
            address: "Ленина 1".to_string(),
            date: "05.08.2026".to_string(),
            time: "14:00".to_string(),
            cleaning_type: "Генеральная".to_string(),
            equipment: "С оборудованием".to_string(),
            conditions: "60% мастеру".to_string(),
            comment: String::new(),
            client_contact: "+79001234567".to_string(),
            manager_contact: "10".to_string(),
            manager_id: 10,
            master_id: None,
            status: OrderStatus::Published,
            created_at: "2026-08-05T10:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn brief_omits_address_and_contacts() {
        let brief = order_brief(&make_order());
        assert!(brief.contains("Заявка #7"));
        assert!(brief.contains("Москва"));
        assert!(brief.contains("Комментарий: -"));
        assert!(!brief.contains("Ленина"));
        assert!(!brief.contains("+79001234567"));
    }

    #[test]
    fn full_includes_address_but_not_client_contact() {
        let full = order_full(&make_order());
        assert!(full.contains("Адрес: Ленина 1"));
        assert!(full.contains("Условия: 60% мастеру"));
        assert!(!full.contains("+79001234567"));
    }

    #[test]
    fn detail_includes_everything() {
        let detail = order_detail(&make_order());
        assert!(detail.contains("+79001234567"));
        assert!(detail.contains("Мастер TG: -"));
        assert!(detail.contains("Статус: published"));
    }

    #[test]
    fn user_link_renders_html_anchor() {
        assert_eq!(
            user_link(Some(42), "написать менеджеру"),
            r#"<a href="tg://user?id=42">написать менеджеру</a>"#
        );
        assert_eq!(user_link(None, "x"), "-");
    }

    #[test]
    fn empty_orders_list_has_placeholder() {
        assert_eq!(orders_list(&[], "Заявки:"), "Заявки не найдены.");
    }

    #[test]
    fn error_mapping_covers_the_taxonomy() {
        assert_eq!(
            user_message(&BrigadirError::OrderNotFound(5)),
            "Заявка не найдена."
        );
        assert_eq!(
            user_message(&BrigadirError::AlreadyTaken { order_id: 5 }),
            "Заявка уже занята."
        );
        assert_eq!(
            user_message(&BrigadirError::Unauthorized("nope".into())),
            "Нет доступа."
        );
        assert!(user_message(&BrigadirError::Validation("id".into())).contains("Некорректный"));
        assert_eq!(
            user_message(&BrigadirError::Internal("boom".into())),
            "Внутренняя ошибка. Попробуйте позже."
        );
    }
}
