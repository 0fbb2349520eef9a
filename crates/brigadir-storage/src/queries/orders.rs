// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order CRUD and the race-safe claim transaction.

use brigadir_core::{BrigadirError, NewOrder, Order, OrderStatus};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::parse_column;

const ORDER_COLUMNS: &str = "id, city, address, date, time, cleaning_type, equipment, \
     conditions, comment, client_contact, manager_contact, manager_id, master_id, \
     status, created_at";

/// Outcome of a claim attempt. `AlreadyTaken` means the guard rejected
/// the claim without mutating anything.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Assigned(Order),
    AlreadyTaken,
    NotFound,
}

fn row_to_order(row: &rusqlite::Row<'_>) -> Result<Order, rusqlite::Error> {
    let city: String = row.get(1)?;
    let status: String = row.get(13)?;
    Ok(Order {
        id: row.get(0)?,
        city: parse_column(1, &city)?,
        address: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        cleaning_type: row.get(5)?,
        equipment: row.get(6)?,
        conditions: row.get(7)?,
        comment: row.get(8)?,
        client_contact: row.get(9)?,
        manager_contact: row.get(10)?,
        manager_id: row.get(11)?,
        master_id: row.get(12)?,
        status: parse_column(13, &status)?,
        created_at: row.get(14)?,
    })
}

/// Create a new order with the given status. Returns the stored row.
pub async fn create_order(
    db: &Database,
    new_order: &NewOrder,
    status: OrderStatus,
) -> Result<Order, BrigadirError> {
    let new_order = new_order.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO orders (city, address, date, time, cleaning_type, equipment,
                     conditions, comment, client_contact, manager_contact, manager_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    new_order.city.to_string(),
                    new_order.address,
                    new_order.date,
                    new_order.time,
                    new_order.cleaning_type,
                    new_order.equipment,
                    new_order.conditions,
                    new_order.comment,
                    new_order.client_contact,
                    new_order.manager_contact,
                    new_order.manager_id,
                    status.to_string(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![id],
                row_to_order,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get an order by id.
pub async fn get_order(db: &Database, order_id: i64) -> Result<Option<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            );
            match result {
                Ok(order) => Ok(Some(order)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all orders, oldest first.
pub async fn list_all(db: &Database) -> Result<Vec<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id ASC"))?;
            let rows = stmt.query_map([], row_to_order)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List orders created by the given manager, oldest first.
pub async fn list_by_manager(
    db: &Database,
    manager_id: i64,
) -> Result<Vec<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE manager_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![manager_id], row_to_order)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List orders assigned to the given master, oldest first.
pub async fn list_by_master(db: &Database, master_id: i64) -> Result<Vec<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE master_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![master_id], row_to_order)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List the most recent orders, optionally filtered by status.
pub async fn list_recent(
    db: &Database,
    status: Option<OrderStatus>,
    limit: i64,
) -> Result<Vec<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1
                         ORDER BY id DESC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![status.to_string(), limit], row_to_order)?;
                    rows.collect()
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC LIMIT ?1"
                    ))?;
                    let rows = stmt.query_map(params![limit], row_to_order)?;
                    rows.collect()
                }
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Race-safe claim: assign `master_id` to the order iff it is still
/// unclaimed.
///
/// The claimability check, the response-log insert, and the assignment
/// write happen in one transaction on the single writer connection, so
/// two concurrent claims cannot both succeed: the loser observes the
/// post-claim status and gets `AlreadyTaken`. A losing attempt leaves no
/// response row.
pub async fn claim(
    db: &Database,
    order_id: i64,
    master_id: i64,
) -> Result<ClaimOutcome, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let current = {
                let result = tx.query_row(
                    "SELECT status, master_id FROM orders WHERE id = ?1",
                    params![order_id],
                    |row| {
                        let status: String = row.get(0)?;
                        let master: Option<i64> = row.get(1)?;
                        Ok((status, master))
                    },
                );
                match result {
                    Ok(current) => current,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        tx.commit()?;
                        return Ok(ClaimOutcome::NotFound);
                    }
                    Err(e) => return Err(e),
                }
            };

            let status: OrderStatus = parse_column(0, &current.0)?;
            if !status.is_claimable() || current.1.is_some() {
                tx.commit()?;
                return Ok(ClaimOutcome::AlreadyTaken);
            }

            tx.execute(
                "INSERT INTO responses (order_id, master_id) VALUES (?1, ?2)",
                params![order_id, master_id],
            )?;
            tx.execute(
                "UPDATE orders SET master_id = ?1, status = ?2 WHERE id = ?3",
                params![master_id, OrderStatus::Assigned.to_string(), order_id],
            )?;

            let order = tx.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            )?;
            tx.commit()?;
            Ok(ClaimOutcome::Assigned(order))
        })
        .await
        .map_err(map_tr_err)
}

/// Assign a master unconditionally (admin reassignment path).
pub async fn assign(
    db: &Database,
    order_id: i64,
    master_id: i64,
) -> Result<Option<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET master_id = ?1, status = ?2 WHERE id = ?3",
                params![master_id, OrderStatus::Assigned.to_string(), order_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}

/// Clear the master and revert the order to `published`. Idempotent.
pub async fn unassign(db: &Database, order_id: i64) -> Result<Option<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET master_id = NULL, status = ?1 WHERE id = ?2",
                params![OrderStatus::Published.to_string(), order_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}

/// Set the status and clear the master in one statement.
///
/// Used for forced moves into statuses that carry no master, so a claim
/// racing the forced move can never leave a master on a masterless
/// status.
pub async fn set_status_clearing_master(
    db: &Database,
    order_id: i64,
    status: OrderStatus,
) -> Result<Option<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?1, master_id = NULL WHERE id = ?2",
                params![status.to_string(), order_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}

/// Set the status column without transition validation.
///
/// This is the storage primitive behind the engine's guarded transitions
/// and its force-status override; callers are responsible for guards.
pub async fn set_status(
    db: &Database,
    order_id: i64,
    status: OrderStatus,
) -> Result<Option<Order>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status.to_string(), order_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![order_id],
                row_to_order,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}
