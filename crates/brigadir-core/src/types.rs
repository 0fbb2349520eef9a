// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Brigadir workspace.
//!
//! Enum keys (the `snake_case` strum renderings) are what goes into the
//! database and into callback payloads; `label()` returns the
//! human-readable Russian text shown to users.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle status of an order.
///
/// The status column is written exclusively by the lifecycle engine;
/// see `brigadir-orders` for the transition rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Published,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses accept no further guarded transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a master may still claim an order in this status.
    pub fn is_claimable(self) -> bool {
        matches!(self, Self::Created | Self::Published)
    }
}

/// Access role assigned to a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Master,
}

/// City an order is published into. Each city routes to its own
/// group-chat topic thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum City {
    Moscow,
    Spb,
    Novosibirsk,
    Chelyabinsk,
    Ufa,
    Kazan,
    Omsk,
    Krasnoyarsk,
    NizhnyNovgorod,
    Voronezh,
}

impl City {
    /// Human-readable city name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Moscow => "Москва",
            Self::Spb => "Санкт-Петербург",
            Self::Novosibirsk => "Новосибирск",
            Self::Chelyabinsk => "Челябинск",
            Self::Ufa => "Уфа",
            Self::Kazan => "Казань",
            Self::Omsk => "Омск",
            Self::Krasnoyarsk => "Красноярск",
            Self::NizhnyNovgorod => "Нижний Новгород",
            Self::Voronezh => "Воронеж",
        }
    }
}

/// Kind of cleaning requested in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CleaningType {
    Maintenance,
    General,
    PostRenovation,
    Other,
}

impl CleaningType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Поддерживающая",
            Self::General => "Генеральная",
            Self::PostRenovation => "После ремонта",
            Self::Other => "Другое",
        }
    }
}

/// Whether the master brings their own equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentOption {
    WithEquipment,
    NoEquipment,
}

impl EquipmentOption {
    pub fn label(self) -> &'static str {
        match self {
            Self::WithEquipment => "С оборудованием",
            Self::NoEquipment => "Без оборудования",
        }
    }
}

/// Payment split offered to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PaymentTerms {
    #[strum(serialize = "percent_60")]
    Percent60,
    #[strum(serialize = "percent_70")]
    Percent70,
    Fixed,
    Other,
}

impl PaymentTerms {
    pub fn label(self) -> &'static str {
        match self {
            Self::Percent60 => "60% мастеру",
            Self::Percent70 => "70% мастеру",
            Self::Fixed => "Фикс",
            Self::Other => "Иное",
        }
    }
}

/// Category tag on an uploaded order photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    Before,
    After,
}

/// A persisted cleaning-service order.
///
/// `date` and `time` are free text as entered by the manager; they are
/// not validated as calendar types. Catalog selections (`cleaning_type`,
/// `equipment`, `conditions`) store the human-readable label chosen at
/// form time, matching what is announced to masters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub city: City,
    pub address: String,
    pub date: String,
    pub time: String,
    pub cleaning_type: String,
    pub equipment: String,
    pub conditions: String,
    pub comment: String,
    pub client_contact: String,
    pub manager_contact: String,
    /// Telegram id of the manager who created the order. Immutable.
    pub manager_id: i64,
    /// Telegram id of the assigned master. `None` iff the order is
    /// unclaimed (created/published/cancelled-before-assignment).
    pub master_id: Option<i64>,
    pub status: OrderStatus,
    pub created_at: String,
}

/// Fields required to create a new order. Produced by a confirmed form
/// session; the store assigns id, status, and the creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub city: City,
    pub address: String,
    pub date: String,
    pub time: String,
    pub cleaning_type: String,
    pub equipment: String,
    pub conditions: String,
    pub comment: String,
    pub client_contact: String,
    pub manager_contact: String,
    pub manager_id: i64,
}

/// Append-only record of a master's successful claim on an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResponse {
    pub id: i64,
    pub order_id: i64,
    pub master_id: i64,
    pub responded_at: String,
}

/// Metadata for a before/after photo attached to an order. The media
/// itself stays with the messaging transport; only its file id is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPhoto {
    pub id: i64,
    pub order_id: i64,
    pub file_id: String,
    pub kind: PhotoKind,
    pub uploaded_at: String,
}

/// A known Telegram user. Created lazily on first interaction; the role
/// stays `None` until assigned by an admin or the allowlist.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub role: Option<Role>,
    pub city: String,
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    /// Whether the user holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_keys_round_trip() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Published,
            OrderStatus::Assigned,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let key = status.to_string();
            assert_eq!(OrderStatus::from_str(&key).unwrap(), status);
        }
        assert_eq!(OrderStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn unknown_status_token_rejected() {
        assert!(OrderStatus::from_str("archived").is_err());
    }

    #[test]
    fn claimable_and_terminal() {
        assert!(OrderStatus::Created.is_claimable());
        assert!(OrderStatus::Published.is_claimable());
        assert!(!OrderStatus::Assigned.is_claimable());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Published.is_terminal());
    }

    #[test]
    fn city_keys_match_routing_table() {
        assert_eq!(City::NizhnyNovgorod.to_string(), "nizhny_novgorod");
        assert_eq!(City::from_str("spb").unwrap(), City::Spb);
        assert_eq!(City::Moscow.label(), "Москва");
    }

    #[test]
    fn payment_terms_keys() {
        assert_eq!(PaymentTerms::Percent60.to_string(), "percent_60");
        assert_eq!(
            PaymentTerms::from_str("percent_70").unwrap(),
            PaymentTerms::Percent70
        );
    }

    #[test]
    fn user_role_check() {
        let user = User {
            id: 1,
            telegram_id: 42,
            role: Some(Role::Master),
            city: String::new(),
            is_active: true,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        assert!(user.has_role(Role::Master));
        assert!(!user.has_role(Role::Manager));
    }
}
