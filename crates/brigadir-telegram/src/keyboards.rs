// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboard builders.
//!
//! All button layouts live here so handler code never assembles markup
//! by hand.

use brigadir_core::{City, CleaningType, EquipmentOption, PaymentTerms};
use strum::IntoEnumIterator;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::callback::CallbackAction;

fn button(label: &str, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.to_string(), action.encode())
}

fn back_cancel_rows(rows: &mut Vec<Vec<InlineKeyboardButton>>) {
    rows.push(vec![button("Назад", CallbackAction::FlowBack)]);
    rows.push(vec![button("Отмена", CallbackAction::FlowCancel)]);
}

/// Two-column grid over every city, plus cancel.
pub fn city_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for pair in City::iter().collect::<Vec<_>>().chunks(2) {
        rows.push(
            pair.iter()
                .map(|city| button(city.label(), CallbackAction::City(*city)))
                .collect(),
        );
    }
    rows.push(vec![button("Отмена", CallbackAction::FlowCancel)]);
    InlineKeyboardMarkup::new(rows)
}

/// Today/tomorrow fast paths plus manual entry.
pub fn date_keyboard() -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![
            button("Сегодня", CallbackAction::DateToday),
            button("Завтра", CallbackAction::DateTomorrow),
        ],
        vec![button("Ввести вручную", CallbackAction::DateManual)],
    ];
    back_cancel_rows(&mut rows);
    InlineKeyboardMarkup::new(rows)
}

pub fn cleaning_type_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for pair in CleaningType::iter().collect::<Vec<_>>().chunks(2) {
        rows.push(
            pair.iter()
                .map(|kind| button(kind.label(), CallbackAction::CleaningType(*kind)))
                .collect(),
        );
    }
    back_cancel_rows(&mut rows);
    InlineKeyboardMarkup::new(rows)
}

pub fn equipment_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = EquipmentOption::iter()
        .map(|option| vec![button(option.label(), CallbackAction::Equipment(option))])
        .collect();
    back_cancel_rows(&mut rows);
    InlineKeyboardMarkup::new(rows)
}

pub fn conditions_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for pair in PaymentTerms::iter().collect::<Vec<_>>().chunks(2) {
        rows.push(
            pair.iter()
                .map(|terms| button(terms.label(), CallbackAction::Conditions(*terms)))
                .collect(),
        );
    }
    back_cancel_rows(&mut rows);
    InlineKeyboardMarkup::new(rows)
}

/// Skip the optional comment, or navigate.
pub fn skip_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("Пропустить", CallbackAction::FlowSkip),
            button("Назад", CallbackAction::FlowBack),
        ],
        vec![button("Отмена", CallbackAction::FlowCancel)],
    ])
}

/// Final confirmation of the assembled order.
pub fn confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("Подтвердить", CallbackAction::FlowConfirm),
            button("Назад", CallbackAction::FlowBack),
        ],
        vec![button("Отмена", CallbackAction::FlowCancel)],
    ])
}

/// The single respond button under a group announcement.
pub fn group_response_keyboard(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(
        "Откликнуться",
        CallbackAction::Respond(order_id),
    )]])
}

/// Accept/decline pair sent to the claiming master's DM.
pub fn master_accept_keyboard(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("Принять", CallbackAction::Accept(order_id)),
        button("Отказаться", CallbackAction::Decline(order_id)),
    ]])
}

/// Photo workflow actions while the order is in progress.
pub fn photo_actions_keyboard(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Загрузить фото ДО", CallbackAction::PhotoBefore(order_id))],
        vec![button("Загрузить фото ПОСЛЕ", CallbackAction::PhotoAfter(order_id))],
        vec![button("Завершить заказ", CallbackAction::Finish(order_id))],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(data.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn city_keyboard_lists_every_city_and_cancel() {
        let data = all_callback_data(&city_keyboard());
        assert_eq!(data.len(), 11);
        assert!(data.contains(&"city:moscow".to_string()));
        assert!(data.contains(&"city:nizhny_novgorod".to_string()));
        assert_eq!(data.last().unwrap(), "flow:cancel");
    }

    #[test]
    fn every_flow_keyboard_payload_parses() {
        use crate::callback::CallbackAction;
        for markup in [
            city_keyboard(),
            date_keyboard(),
            cleaning_type_keyboard(),
            equipment_keyboard(),
            conditions_keyboard(),
            skip_keyboard(),
            confirm_keyboard(),
            group_response_keyboard(3),
            master_accept_keyboard(3),
            photo_actions_keyboard(3),
        ] {
            for data in all_callback_data(&markup) {
                assert!(CallbackAction::parse(&data).is_some(), "unparseable: {data}");
            }
        }
    }

    #[test]
    fn date_keyboard_has_fast_paths_first() {
        let data = all_callback_data(&date_keyboard());
        assert_eq!(data[0], "date:today");
        assert_eq!(data[1], "date:tomorrow");
        assert_eq!(data[2], "date:manual");
    }

    #[test]
    fn photo_actions_target_the_order() {
        let data = all_callback_data(&photo_actions_keyboard(77));
        assert_eq!(
            data,
            vec!["photo_before:77", "photo_after:77", "finish:77"]
        );
    }
}
