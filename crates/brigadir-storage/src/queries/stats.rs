// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation queries backing the admin analytics surface.

use brigadir_core::{BrigadirError, OrderStatus};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Total order count.
pub async fn count_orders(db: &Database) -> Result<i64, BrigadirError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// Order counts per status. Statuses with no orders are absent; callers
/// that want the full breakdown fill in zeroes from [`OrderStatus`].
pub async fn count_by_status(db: &Database) -> Result<Vec<(String, i64)>, BrigadirError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM orders GROUP BY status")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Order counts per city, busiest first.
pub async fn count_by_city(db: &Database) -> Result<Vec<(String, i64)>, BrigadirError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT city, COUNT(*) FROM orders GROUP BY city ORDER BY COUNT(*) DESC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Managers ranked by number of created orders.
pub async fn top_managers(db: &Database, limit: i64) -> Result<Vec<(i64, i64)>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT manager_id, COUNT(*) FROM orders
                 GROUP BY manager_id ORDER BY COUNT(*) DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Masters ranked by number of assigned orders.
pub async fn top_masters(db: &Database, limit: i64) -> Result<Vec<(i64, i64)>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT master_id, COUNT(*) FROM orders WHERE master_id IS NOT NULL
                 GROUP BY master_id ORDER BY COUNT(*) DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Completion counts for one participant: (total, completed).
///
/// `column` is validated by the callers in `brigadir-orders`; this query
/// only ever runs with `manager_id` or `master_id`.
pub async fn participant_totals(
    db: &Database,
    by_master: bool,
    telegram_id: i64,
) -> Result<(i64, i64), BrigadirError> {
    db.connection()
        .call(move |conn| {
            let column = if by_master { "master_id" } else { "manager_id" };
            conn.query_row(
                &format!(
                    "SELECT COUNT(*), COALESCE(SUM(status = ?1), 0) FROM orders
                     WHERE {column} = ?2"
                ),
                params![OrderStatus::Completed.to_string(), telegram_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .await
        .map_err(map_tr_err)
}
