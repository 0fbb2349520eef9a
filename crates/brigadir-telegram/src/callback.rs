// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callback-data encoding for inline buttons.
//!
//! All button payloads use the `prefix:payload` shape. Parsing is total:
//! anything malformed maps to `None` and the press is answered with a
//! generic error instead of being applied.

use std::str::FromStr;

use brigadir_core::{City, CleaningType, EquipmentOption, PaymentTerms};

/// A decoded button press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallbackAction {
    /// Form: city chosen.
    City(City),
    /// Form: today/tomorrow fast path.
    DateToday,
    DateTomorrow,
    /// Form: switch to manual date entry.
    DateManual,
    CleaningType(CleaningType),
    Equipment(EquipmentOption),
    Conditions(PaymentTerms),
    FlowBack,
    FlowCancel,
    FlowSkip,
    FlowConfirm,
    /// Master responds to a group announcement.
    Respond(i64),
    /// Master accepts the assigned order.
    Accept(i64),
    /// Master declines the assigned order.
    Decline(i64),
    PhotoBefore(i64),
    PhotoAfter(i64),
    /// Master finishes the in-progress order.
    Finish(i64),
}

impl CallbackAction {
    /// Encode into the wire string placed on the button.
    pub fn encode(self) -> String {
        match self {
            Self::City(city) => format!("city:{city}"),
            Self::DateToday => "date:today".to_string(),
            Self::DateTomorrow => "date:tomorrow".to_string(),
            Self::DateManual => "date:manual".to_string(),
            Self::CleaningType(kind) => format!("type:{kind}"),
            Self::Equipment(option) => format!("equip:{option}"),
            Self::Conditions(terms) => format!("cond:{terms}"),
            Self::FlowBack => "flow:back".to_string(),
            Self::FlowCancel => "flow:cancel".to_string(),
            Self::FlowSkip => "flow:skip".to_string(),
            Self::FlowConfirm => "flow:confirm".to_string(),
            Self::Respond(id) => format!("resp:{id}"),
            Self::Accept(id) => format!("accept:{id}"),
            Self::Decline(id) => format!("decline:{id}"),
            Self::PhotoBefore(id) => format!("photo_before:{id}"),
            Self::PhotoAfter(id) => format!("photo_after:{id}"),
            Self::Finish(id) => format!("finish:{id}"),
        }
    }

    /// Decode a wire string back into an action.
    pub fn parse(data: &str) -> Option<Self> {
        let (prefix, payload) = data.split_once(':')?;
        match prefix {
            "city" => City::from_str(payload).ok().map(Self::City),
            "date" => match payload {
                "today" => Some(Self::DateToday),
                "tomorrow" => Some(Self::DateTomorrow),
                "manual" => Some(Self::DateManual),
                _ => None,
            },
            "type" => CleaningType::from_str(payload).ok().map(Self::CleaningType),
            "equip" => EquipmentOption::from_str(payload).ok().map(Self::Equipment),
            "cond" => PaymentTerms::from_str(payload).ok().map(Self::Conditions),
            "flow" => match payload {
                "back" => Some(Self::FlowBack),
                "cancel" => Some(Self::FlowCancel),
                "skip" => Some(Self::FlowSkip),
                "confirm" => Some(Self::FlowConfirm),
                _ => None,
            },
            "resp" => payload.parse().ok().map(Self::Respond),
            "accept" => payload.parse().ok().map(Self::Accept),
            "decline" => payload.parse().ok().map(Self::Decline),
            "photo_before" => payload.parse().ok().map(Self::PhotoBefore),
            "photo_after" => payload.parse().ok().map(Self::PhotoAfter),
            "finish" => payload.parse().ok().map(Self::Finish),
            _ => None,
        }
    }
}
