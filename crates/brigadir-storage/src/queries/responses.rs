// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the append-only claim log.
//!
//! Rows are inserted exclusively by the claim transaction in
//! `queries::orders::claim`; a claim that loses the race leaves no row,
//! so response counts measure assignments made, not attempts.

use brigadir_core::{BrigadirError, OrderResponse};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn row_to_response(row: &rusqlite::Row<'_>) -> Result<OrderResponse, rusqlite::Error> {
    Ok(OrderResponse {
        id: row.get(0)?,
        order_id: row.get(1)?,
        master_id: row.get(2)?,
        responded_at: row.get(3)?,
    })
}

/// List responses logged against an order, oldest first.
pub async fn list_for_order(
    db: &Database,
    order_id: i64,
) -> Result<Vec<OrderResponse>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, order_id, master_id, responded_at FROM responses
                 WHERE order_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![order_id], row_to_response)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of logged responses.
pub async fn count(db: &Database) -> Result<i64, BrigadirError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}
