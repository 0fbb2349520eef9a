// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only order photo log.

use brigadir_core::{BrigadirError, OrderPhoto, PhotoKind};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::parse_column;

fn row_to_photo(row: &rusqlite::Row<'_>) -> Result<OrderPhoto, rusqlite::Error> {
    let kind: String = row.get(3)?;
    Ok(OrderPhoto {
        id: row.get(0)?,
        order_id: row.get(1)?,
        file_id: row.get(2)?,
        kind: parse_column(3, &kind)?,
        uploaded_at: row.get(4)?,
    })
}

/// Append a photo record for an order. The media itself stays with the
/// messaging transport; only its opaque file id is stored.
pub async fn append(
    db: &Database,
    order_id: i64,
    file_id: &str,
    kind: PhotoKind,
) -> Result<OrderPhoto, BrigadirError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO order_photos (order_id, file_id, kind) VALUES (?1, ?2, ?3)",
                params![order_id, file_id, kind.to_string()],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT id, order_id, file_id, kind, uploaded_at FROM order_photos WHERE id = ?1",
                params![id],
                row_to_photo,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// List photos attached to an order, oldest first.
pub async fn list_for_order(
    db: &Database,
    order_id: i64,
) -> Result<Vec<OrderPhoto>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, order_id, file_id, kind, uploaded_at FROM order_photos
                 WHERE order_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![order_id], row_to_photo)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List every photo, oldest first. Used by the full CSV export to group
/// file ids per order.
pub async fn list_all(db: &Database) -> Result<Vec<OrderPhoto>, BrigadirError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, order_id, file_id, kind, uploaded_at FROM order_photos ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], row_to_photo)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use brigadir_core::{City, NewOrder, OrderStatus};
    use tempfile::tempdir;

    use super::*;
    use crate::queries::orders;

    async fn setup_order() -> (Database, tempfile::TempDir, i64) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let order = orders::create_order(
            &db,
            &NewOrder {
                city: City::Kazan,
                address: "Баумана 5".to_string(),
                date: "02.03.2026".to_string(),
                time: "10:00".to_string(),
                cleaning_type: "Поддерживающая".to_string(),
                equipment: "Без оборудования".to_string(),
                conditions: "Фикс".to_string(),
                comment: String::new(),
                client_contact: "+79000000000".to_string(),
                manager_contact: "10".to_string(),
                manager_id: 10,
            },
            OrderStatus::Published,
        )
        .await
        .unwrap();
        (db, dir, order.id)
    }

    #[tokio::test]
    async fn append_and_list_preserves_kind_and_order() {
        let (db, _dir, order_id) = setup_order().await;

        append(&db, order_id, "file-before-1", PhotoKind::Before)
            .await
            .unwrap();
        append(&db, order_id, "file-after-1", PhotoKind::After)
            .await
            .unwrap();
        append(&db, order_id, "file-after-2", PhotoKind::After)
            .await
            .unwrap();

        let photos = list_for_order(&db, order_id).await.unwrap();
        assert_eq!(photos.len(), 3);
        assert_eq!(photos[0].kind, PhotoKind::Before);
        assert_eq!(photos[1].file_id, "file-after-1");
        assert_eq!(photos[2].kind, PhotoKind::After);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_for_missing_order_is_empty() {
        let (db, _dir, _order_id) = setup_order().await;
        assert!(list_for_order(&db, 999).await.unwrap().is_empty());
        db.close().await.unwrap();
    }
}
