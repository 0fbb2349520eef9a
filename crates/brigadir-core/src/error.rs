// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Brigadir workspace.

use thiserror::Error;

/// The primary error type used across storage, engine, and handler code.
///
/// Everything except [`Delivery`](BrigadirError::Delivery) is resolved
/// before a store mutation commits; delivery failures happen strictly
/// after the authoritative state change and are reported as a partial
/// success, never rolled back.
#[derive(Debug, Error)]
pub enum BrigadirError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Referenced order does not exist.
    #[error("order #{0} not found")]
    OrderNotFound(i64),

    /// Referenced user does not exist.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// Claim attempted on an order that already has a master.
    #[error("order #{order_id} is already taken")]
    AlreadyTaken { order_id: i64 },

    /// Actor lacks the required role or is not the order's current master.
    #[error("access denied: {0}")]
    Unauthorized(String),

    /// Malformed input: non-numeric id, unknown status or role token.
    /// The originating input is never partially applied.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Announcement or direct-message send failed after the state change
    /// was already committed.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BrigadirError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
