// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only reporting aggregates for the admin surface.

use std::str::FromStr;

use brigadir_core::{BrigadirError, City, OrderStatus};
use brigadir_storage::queries::stats;
use brigadir_storage::Database;
use strum::IntoEnumIterator;

const TOP_LIMIT: i64 = 5;

/// One snapshot of the numbers behind `/stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsOverview {
    pub total_orders: i64,
    /// Every status appears, zero-filled, in enum order.
    pub by_status: Vec<(OrderStatus, i64)>,
    /// Busiest cities first.
    pub by_city: Vec<(City, i64)>,
    pub top_managers: Vec<(i64, i64)>,
    pub top_masters: Vec<(i64, i64)>,
}

/// Collect the full stats snapshot.
pub async fn overview(db: &Database) -> Result<StatsOverview, BrigadirError> {
    let total_orders = stats::count_orders(db).await?;

    let raw_by_status = stats::count_by_status(db).await?;
    let by_status = OrderStatus::iter()
        .map(|status| {
            let key = status.to_string();
            let count = raw_by_status
                .iter()
                .find(|(s, _)| *s == key)
                .map(|(_, c)| *c)
                .unwrap_or(0);
            (status, count)
        })
        .collect();

    let by_city = stats::count_by_city(db)
        .await?
        .into_iter()
        .filter_map(|(key, count)| City::from_str(&key).ok().map(|city| (city, count)))
        .collect();

    let top_managers = stats::top_managers(db, TOP_LIMIT).await?;
    let top_masters = stats::top_masters(db, TOP_LIMIT).await?;

    Ok(StatsOverview {
        total_orders,
        by_status,
        by_city,
        top_managers,
        top_masters,
    })
}

/// (total, completed) counts for one manager's orders.
pub async fn manager_totals(db: &Database, manager_id: i64) -> Result<(i64, i64), BrigadirError> {
    stats::participant_totals(db, false, manager_id).await
}

/// (total, completed) counts for one master's orders.
pub async fn master_totals(db: &Database, master_id: i64) -> Result<(i64, i64), BrigadirError> {
    stats::participant_totals(db, true, master_id).await
}

#[cfg(test)]
mod tests {
    use brigadir_core::NewOrder;
    use brigadir_storage::queries::orders;
    use tempfile::tempdir;

    use super::*;

    fn make_new_order(city: City, manager_id: i64) -> NewOrder {
        NewOrder {
            city,
            address: "адрес".to_string(),
            date: "01.01.2026".to_string(),
            time: "12:00".to_string(),
            cleaning_type: "Генеральная".to_string(),
            equipment: "С оборудованием".to_string(),
            conditions: "Фикс".to_string(),
            comment: String::new(),
            client_contact: "+7".to_string(),
            manager_contact: manager_id.to_string(),
            manager_id,
        }
    }

    #[tokio::test]
    async fn overview_on_empty_store_is_all_zero() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("a.db").to_str().unwrap())
            .await
            .unwrap();

        let snapshot = overview(&db).await.unwrap();
        assert_eq!(snapshot.total_orders, 0);
        assert_eq!(snapshot.by_status.len(), 6, "every status is present");
        assert!(snapshot.by_status.iter().all(|(_, count)| *count == 0));
        assert!(snapshot.by_city.is_empty());
        assert!(snapshot.top_managers.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn overview_counts_statuses_and_cities() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("b.db").to_str().unwrap())
            .await
            .unwrap();

        for _ in 0..2 {
            orders::create_order(&db, &make_new_order(City::Moscow, 10), OrderStatus::Published)
                .await
                .unwrap();
        }
        let spb = orders::create_order(&db, &make_new_order(City::Spb, 11), OrderStatus::Published)
            .await
            .unwrap();
        orders::claim(&db, spb.id, 500).await.unwrap();

        let snapshot = overview(&db).await.unwrap();
        assert_eq!(snapshot.total_orders, 3);
        assert!(snapshot
            .by_status
            .contains(&(OrderStatus::Published, 2)));
        assert!(snapshot.by_status.contains(&(OrderStatus::Assigned, 1)));
        assert!(snapshot.by_status.contains(&(OrderStatus::Cancelled, 0)));
        assert_eq!(snapshot.by_city[0], (City::Moscow, 2));
        assert_eq!(snapshot.top_masters, vec![(500, 1)]);

        db.close().await.unwrap();
    }
}
