// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Brigadir dispatch bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! modules for orders, users, responses, and order photos.
//!
//! The claim guard lives here: `queries::orders::claim` evaluates
//! claimability and writes the assignment inside one transaction on the
//! writer connection, which is the sole source of truth for the
//! single-assignment guarantee.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
pub use queries::orders::ClaimOutcome;
