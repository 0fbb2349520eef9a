// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod orders;
pub mod photos;
pub mod responses;
pub mod stats;
pub mod users;

/// Parses an enum stored as TEXT, reporting failures as row conversion
/// errors so they surface through the normal rusqlite error path.
pub(crate) fn parse_column<T>(idx: usize, value: &str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
