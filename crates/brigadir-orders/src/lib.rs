// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order lifecycle engine and guided-form state machine.
//!
//! This crate owns the business rules of the dispatch flow:
//!
//! - [`OrderEngine`] is the sole writer of order status. Guarded
//!   transitions (claim, accept, decline, finish) enforce the lifecycle
//!   table; `unassign` and `force_status` are the documented unchecked
//!   paths for admin intervention.
//! - [`OrderForm`] / [`FormStep`] implement the ten-step guided order
//!   creation dialogue, with deterministic back navigation and
//!   today/tomorrow date fast paths.
//! - [`FormSessions`] is the per-conversation session store with
//!   teardown on confirm or cancel.
//! - `export` and `analytics` back the admin reporting surface.

pub mod analytics;
pub mod engine;
pub mod export;
pub mod form;
pub mod sessions;

pub use engine::OrderEngine;
pub use form::{FormStep, OrderForm};
pub use sessions::{CaptureSessions, FormSessions};
