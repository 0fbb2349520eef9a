// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV exports for the admin surface.
//!
//! `;`-delimited UTF-8, matching what the operators' spreadsheets
//! expect. With no orders the output is the header row alone.

use std::collections::HashMap;

use brigadir_core::{BrigadirError, PhotoKind};
use brigadir_storage::queries::{orders, photos};
use brigadir_storage::Database;

fn csv_error(e: impl std::error::Error) -> BrigadirError {
    BrigadirError::Internal(format!("csv export failed: {e}"))
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().delimiter(b';').from_writer(Vec::new())
}

/// Key order fields only: one row per order.
pub async fn export_basic(db: &Database) -> Result<Vec<u8>, BrigadirError> {
    let all = orders::list_all(db).await?;

    let mut wtr = writer();
    wtr.write_record(["id", "city", "date", "time", "status", "manager_id", "master_id"])
        .map_err(csv_error)?;
    for order in &all {
        wtr.write_record([
            order.id.to_string(),
            order.city.to_string(),
            order.date.clone(),
            order.time.clone(),
            order.status.to_string(),
            order.manager_id.to_string(),
            order.master_id.map(|id| id.to_string()).unwrap_or_default(),
        ])
        .map_err(csv_error)?;
    }
    wtr.into_inner().map_err(csv_error)
}

/// Every order field plus the attached photo file ids, grouped by kind.
pub async fn export_full(db: &Database) -> Result<Vec<u8>, BrigadirError> {
    let all = orders::list_all(db).await?;
    let all_photos = photos::list_all(db).await?;

    // file ids per (order, kind), in upload order
    let mut grouped: HashMap<(i64, PhotoKind), Vec<String>> = HashMap::new();
    for photo in all_photos {
        grouped
            .entry((photo.order_id, photo.kind))
            .or_default()
            .push(photo.file_id);
    }

    let mut wtr = writer();
    wtr.write_record([
        "id",
        "city",
        "address",
        "date",
        "time",
        "type",
        "equipment",
        "conditions",
        "comment",
        "client_contact",
        "manager_contact",
        "manager_id",
        "master_id",
        "status",
        "created_at",
        "photos_before",
        "photos_after",
    ])
    .map_err(csv_error)?;

    for order in &all {
        let before = grouped
            .get(&(order.id, PhotoKind::Before))
            .map(|ids| ids.join(","))
            .unwrap_or_default();
        let after = grouped
            .get(&(order.id, PhotoKind::After))
            .map(|ids| ids.join(","))
            .unwrap_or_default();
        wtr.write_record([
            order.id.to_string(),
            order.city.to_string(),
            order.address.clone(),
            order.date.clone(),
            order.time.clone(),
            order.cleaning_type.clone(),
            order.equipment.clone(),
            order.conditions.clone(),
            order.comment.clone(),
            order.client_contact.clone(),
            order.manager_contact.clone(),
            order.manager_id.to_string(),
            order.master_id.map(|id| id.to_string()).unwrap_or_default(),
            order.status.to_string(),
            order.created_at.clone(),
            before,
            after,
        ])
        .map_err(csv_error)?;
    }
    wtr.into_inner().map_err(csv_error)
}

#[cfg(test)]
mod tests {
    use brigadir_core::{City, NewOrder, OrderStatus};
    use tempfile::tempdir;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("export.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_new_order() -> NewOrder {
        NewOrder {
            city: City::Voronezh,
            address: "Кирова 3".to_string(),
            date: "10.08.2026".to_string(),
            time: "16:30".to_string(),
            cleaning_type: "После ремонта".to_string(),
            equipment: "С оборудованием".to_string(),
            conditions: "70% мастеру".to_string(),
            comment: "два санузла".to_string(),
            client_contact: "+79005554433".to_string(),
            manager_contact: "10".to_string(),
            manager_id: 10,
        }
    }

    #[tokio::test]
    async fn empty_store_exports_header_only() {
        let (db, _dir) = setup_db().await;

        let basic = String::from_utf8(export_basic(&db).await.unwrap()).unwrap();
        assert_eq!(basic.trim(), "id;city;date;time;status;manager_id;master_id");

        let full = String::from_utf8(export_full(&db).await.unwrap()).unwrap();
        assert_eq!(full.lines().count(), 1);
        assert!(full.starts_with("id;city;address"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn basic_export_has_one_row_per_order() {
        let (db, _dir) = setup_db().await;
        orders::create_order(&db, &make_new_order(), OrderStatus::Published)
            .await
            .unwrap();
        let claimed = orders::create_order(&db, &make_new_order(), OrderStatus::Published)
            .await
            .unwrap();
        orders::claim(&db, claimed.id, 501).await.unwrap();

        let csv_text = String::from_utf8(export_basic(&db).await.unwrap()).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("voronezh"));
        assert!(lines[1].ends_with(';'), "unassigned master cell is empty");
        assert!(lines[2].contains("assigned"));
        assert!(lines[2].ends_with("501"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_export_groups_photos_by_kind() {
        let (db, _dir) = setup_db().await;
        let order = orders::create_order(&db, &make_new_order(), OrderStatus::Published)
            .await
            .unwrap();
        photos::append(&db, order.id, "b1", PhotoKind::Before)
            .await
            .unwrap();
        photos::append(&db, order.id, "b2", PhotoKind::Before)
            .await
            .unwrap();
        photos::append(&db, order.id, "a1", PhotoKind::After)
            .await
            .unwrap();

        let csv_text = String::from_utf8(export_full(&db).await.unwrap()).unwrap();
        let row = csv_text.lines().nth(1).unwrap();
        assert!(row.contains("b1,b2"));
        assert!(row.ends_with("a1"));

        db.close().await.unwrap();
    }
}
