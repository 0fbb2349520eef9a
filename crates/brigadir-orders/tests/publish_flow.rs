// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flow: a manager walks the guided form, confirms, and the
//! engine persists a published order backed by the real SQLite store.

use brigadir_core::{City, CleaningType, EquipmentOption, OrderStatus, PaymentTerms};
use brigadir_orders::{FormSessions, OrderEngine, OrderForm};
use brigadir_storage::queries::responses;
use brigadir_storage::Database;
use tempfile::tempdir;

const MANAGER_ID: i64 = 1010;
const CHAT_ID: i64 = 1010;

async fn setup_engine() -> (OrderEngine, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("flow.db").to_str().unwrap())
        .await
        .unwrap();
    (OrderEngine::new(db), dir)
}

#[tokio::test]
async fn guided_form_publishes_an_unclaimed_order() {
    let (engine, _dir) = setup_engine().await;
    let sessions = FormSessions::new();

    sessions.begin(CHAT_ID);
    sessions
        .update(CHAT_ID, |form| {
            form.set_city(City::Moscow)?;
            form.set_date(OrderForm::date_today())?;
            form.set_time("14:00".to_string())?;
            form.set_address("Ленина 1".to_string())?;
            form.set_cleaning_type(CleaningType::General)?;
            form.set_equipment(EquipmentOption::WithEquipment)?;
            form.set_conditions(PaymentTerms::Percent60)?;
            form.skip_comment()?;
            form.set_client_contact("+79001234567".to_string())
        })
        .unwrap()
        .unwrap();

    // Confirm tears the session down; the form converts to a request.
    let form = sessions.take(CHAT_ID).unwrap();
    assert!(!sessions.contains(CHAT_ID));
    let new_order = form.confirm(MANAGER_ID).unwrap();

    let order = engine.publish(&new_order).await.unwrap();
    assert_eq!(order.status, OrderStatus::Published);
    assert_eq!(order.master_id, None);
    assert_eq!(order.manager_id, MANAGER_ID);
    assert_eq!(order.city, City::Moscow);
    assert_eq!(order.cleaning_type, "Генеральная");
    assert_eq!(order.comment, "");

    // The fast-path date is the wall-clock day in dd.mm.yyyy.
    assert_eq!(order.date, chrono::Local::now().format("%d.%m.%Y").to_string());
}

#[tokio::test]
async fn published_order_flows_to_completion() {
    let (engine, _dir) = setup_engine().await;
    let sessions = FormSessions::new();

    sessions.begin(CHAT_ID);
    sessions
        .update(CHAT_ID, |form| {
            form.set_city(City::Kazan)?;
            form.set_date("20.08.2026".to_string())?;
            form.set_time("09:30".to_string())?;
            form.set_address("Баумана 5".to_string())?;
            form.set_cleaning_type(CleaningType::PostRenovation)?;
            form.set_equipment(EquipmentOption::NoEquipment)?;
            form.set_conditions(PaymentTerms::Percent70)?;
            form.set_comment("после стройки".to_string())?;
            form.set_client_contact("+79012223344".to_string())
        })
        .unwrap()
        .unwrap();

    let new_order = sessions.take(CHAT_ID).unwrap().confirm(MANAGER_ID).unwrap();
    let order = engine.publish(&new_order).await.unwrap();

    let master = 2020;
    let order = engine.claim(order.id, master).await.unwrap();
    let order = engine.accept(order.id, master).await.unwrap();
    let order = engine.finish(order.id, master).await.unwrap();

    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.master_id, Some(master));

    let logged = responses::list_for_order(engine.database(), order.id)
        .await
        .unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].master_id, master);
}
