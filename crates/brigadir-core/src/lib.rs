// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared domain types and errors for the Brigadir dispatch bot.
//!
//! Every other crate in the workspace depends on this one: the order
//! lifecycle states, role and catalog enums, the persisted record types,
//! and the common [`BrigadirError`] taxonomy live here.

pub mod error;
pub mod types;

pub use error::BrigadirError;
pub use types::{
    City, CleaningType, EquipmentOption, NewOrder, Order, OrderPhoto, OrderResponse, OrderStatus,
    PaymentTerms, PhotoKind, Role, User,
};
