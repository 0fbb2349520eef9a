// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The order lifecycle engine.
//!
//! Lifecycle: `created -> published -> assigned -> in_progress ->
//! completed`, with `cancelled` reachable from any non-terminal state
//! and `published` re-reachable from `assigned` via unassign.
//!
//! The engine is the only writer of the status column. Guarded
//! transitions validate actor and current state before writing;
//! `unassign` is unconditional by contract (callers have already
//! established authorization); `force_status` is the admin escape hatch
//! that skips transition validation entirely and is logged at WARN.

use brigadir_core::{
    BrigadirError, NewOrder, Order, OrderPhoto, OrderStatus, PhotoKind, Role,
};
use brigadir_storage::queries::{orders, photos, users};
use brigadir_storage::{ClaimOutcome, Database};
use metrics::counter;
use tracing::{debug, info, warn};

/// Drives all order state changes against the store.
///
/// Cheap to clone; clones share the same database writer.
#[derive(Clone)]
pub struct OrderEngine {
    db: Database,
}

impl OrderEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database handle, for read-only query access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Persist a confirmed form as a new order in `published` status.
    ///
    /// Announcing the order is the relay's job and happens after this
    /// returns; a failed announcement does not roll the order back.
    pub async fn publish(&self, new_order: &NewOrder) -> Result<Order, BrigadirError> {
        let order = orders::create_order(&self.db, new_order, OrderStatus::Published).await?;
        info!(
            order_id = order.id,
            city = %order.city,
            manager_id = order.manager_id,
            "order published"
        );
        Ok(order)
    }

    /// Fetch an order, or `None` if it does not exist.
    pub async fn get(&self, order_id: i64) -> Result<Option<Order>, BrigadirError> {
        orders::get_order(&self.db, order_id).await
    }

    /// Fetch an order that must exist.
    async fn require(&self, order_id: i64) -> Result<Order, BrigadirError> {
        self.get(order_id)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))
    }

    /// Race-safe claim: `master_id` becomes the order's master iff the
    /// order is still unclaimed.
    ///
    /// The check-then-set runs inside a single store transaction, so of
    /// two simultaneous claims exactly one succeeds; the other gets
    /// [`BrigadirError::AlreadyTaken`] and the order is not mutated.
    /// The winning claim also logs the response row; losers leave none.
    pub async fn claim(&self, order_id: i64, master_id: i64) -> Result<Order, BrigadirError> {
        match orders::claim(&self.db, order_id, master_id).await? {
            ClaimOutcome::Assigned(order) => {
                counter!("brigadir_claims_won_total").increment(1);
                info!(order_id, master_id, "order claimed");
                Ok(order)
            }
            ClaimOutcome::AlreadyTaken => {
                counter!("brigadir_claims_conflict_total").increment(1);
                debug!(order_id, master_id, "claim rejected, already taken");
                Err(BrigadirError::AlreadyTaken { order_id })
            }
            ClaimOutcome::NotFound => Err(BrigadirError::OrderNotFound(order_id)),
        }
    }

    /// Assigned master accepts the job: `assigned -> in_progress`.
    pub async fn accept(&self, order_id: i64, master_id: i64) -> Result<Order, BrigadirError> {
        let order = self.require(order_id).await?;
        self.check_master(&order, master_id)?;
        self.check_status(&order, OrderStatus::Assigned)?;
        let updated = orders::set_status(&self.db, order_id, OrderStatus::InProgress)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))?;
        info!(order_id, master_id, "order accepted");
        Ok(updated)
    }

    /// Assigned master declines the job: `assigned -> published`, master
    /// cleared, order claimable again.
    pub async fn decline(&self, order_id: i64, master_id: i64) -> Result<Order, BrigadirError> {
        let order = self.require(order_id).await?;
        self.check_master(&order, master_id)?;
        self.check_status(&order, OrderStatus::Assigned)?;
        let updated = orders::unassign(&self.db, order_id)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))?;
        info!(order_id, master_id, "order declined, republished");
        Ok(updated)
    }

    /// Working master finishes the job: `in_progress -> completed`.
    ///
    /// No minimum photo count is enforced; an order with zero photos
    /// completes. The photo workflow is advisory (current behavior, not
    /// a validated business rule).
    pub async fn finish(&self, order_id: i64, master_id: i64) -> Result<Order, BrigadirError> {
        let order = self.require(order_id).await?;
        self.check_master(&order, master_id)?;
        self.check_status(&order, OrderStatus::InProgress)?;
        let updated = orders::set_status(&self.db, order_id, OrderStatus::Completed)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))?;
        info!(order_id, master_id, "order completed");
        Ok(updated)
    }

    /// Clear the master and revert to `published`, unconditionally.
    ///
    /// Callers have already established authorization. Idempotent when
    /// the order is already published.
    pub async fn unassign(&self, order_id: i64) -> Result<Order, BrigadirError> {
        let updated = orders::unassign(&self.db, order_id)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))?;
        info!(order_id, "order unassigned");
        Ok(updated)
    }

    /// Admin reassignment: make `master_id` the order's master no matter
    /// its current state, creating the master's user row if needed.
    pub async fn reassign(&self, order_id: i64, master_id: i64) -> Result<Order, BrigadirError> {
        users::ensure_user(&self.db, master_id, Some(Role::Master)).await?;
        let updated = orders::assign(&self.db, order_id, master_id)
            .await?
            .ok_or(BrigadirError::OrderNotFound(order_id))?;
        info!(order_id, master_id, "order reassigned");
        Ok(updated)
    }

    /// Admin escape hatch: set any status without transition validation.
    ///
    /// When the target status does not carry a master (`created`,
    /// `published`, `cancelled`) the master is cleared as well, so the
    /// master/status pairing stays consistent even on forced moves.
    pub async fn force_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order, BrigadirError> {
        warn!(order_id, status = %status, "status forced without transition validation");
        let updated = if matches!(
            status,
            OrderStatus::Created | OrderStatus::Published | OrderStatus::Cancelled
        ) {
            orders::set_status_clearing_master(&self.db, order_id, status).await?
        } else {
            orders::set_status(&self.db, order_id, status).await?
        };
        updated.ok_or(BrigadirError::OrderNotFound(order_id))
    }

    /// Append a before/after photo to an order.
    ///
    /// Only the file id is stored; no status transition occurs and no
    /// count minimum applies.
    pub async fn add_photo(
        &self,
        order_id: i64,
        file_id: &str,
        kind: PhotoKind,
    ) -> Result<OrderPhoto, BrigadirError> {
        self.require(order_id).await?;
        let photo = photos::append(&self.db, order_id, file_id, kind).await?;
        debug!(order_id, kind = %kind, "photo recorded");
        Ok(photo)
    }

    fn check_master(&self, order: &Order, master_id: i64) -> Result<(), BrigadirError> {
        if order.master_id != Some(master_id) {
            return Err(BrigadirError::Unauthorized(format!(
                "order #{} is not assigned to master {}",
                order.id, master_id
            )));
        }
        Ok(())
    }

    fn check_status(&self, order: &Order, expected: OrderStatus) -> Result<(), BrigadirError> {
        if order.status != expected {
            return Err(BrigadirError::Validation(format!(
                "order #{} is {}, expected {}",
                order.id, order.status, expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use brigadir_core::City;
    use brigadir_storage::queries::photos;
    use tempfile::tempdir;

    use super::*;

    async fn setup_engine() -> (OrderEngine, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("engine.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (OrderEngine::new(db), dir)
    }

    fn make_new_order() -> NewOrder {
        NewOrder {
            city: City::Moscow,
            address: "Ленина 1".to_string(),
            date: "05.08.2026".to_string(),
            time: "14:00".to_string(),
            cleaning_type: "Генеральная".to_string(),
            equipment: "С оборудованием".to_string(),
            conditions: "60% мастеру".to_string(),
            comment: String::new(),
            client_contact: "+79001234567".to_string(),
            manager_contact: "10".to_string(),
            manager_id: 10,
        }
    }

    /// `master_id != NULL` exactly when the status carries a master.
    fn assert_invariant(order: &Order) {
        let master_bearing = matches!(
            order.status,
            OrderStatus::Assigned | OrderStatus::InProgress | OrderStatus::Completed
        );
        assert_eq!(
            order.master_id.is_some(),
            master_bearing,
            "invariant violated for order {order:?}"
        );
    }

    #[tokio::test]
    async fn full_lifecycle_holds_invariant_at_every_step() {
        let (engine, _dir) = setup_engine().await;

        let order = engine.publish(&make_new_order()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Published);
        assert_invariant(&order);

        let order = engine.claim(order.id, 501).await.unwrap();
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_invariant(&order);

        let order = engine.accept(order.id, 501).await.unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_invariant(&order);

        let order = engine.finish(order.id, 501).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_invariant(&order);
    }

    #[tokio::test]
    async fn decline_republishes_and_allows_new_claim() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        let order = engine.decline(order.id, 501).await.unwrap();
        assert_eq!(order.status, OrderStatus::Published);
        assert_invariant(&order);

        let order = engine.claim(order.id, 502).await.unwrap();
        assert_eq!(order.master_id, Some(502));
    }

    #[tokio::test]
    async fn second_claim_conflicts() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        let err = engine.claim(order.id, 502).await.unwrap_err();
        assert!(matches!(err, BrigadirError::AlreadyTaken { order_id } if order_id == order.id));
    }

    #[tokio::test]
    async fn wrong_master_is_unauthorized() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        for result in [
            engine.accept(order.id, 666).await,
            engine.decline(order.id, 666).await,
        ] {
            assert!(matches!(result, Err(BrigadirError::Unauthorized(_))));
        }
    }

    #[tokio::test]
    async fn accept_from_wrong_state_is_rejected() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();

        // Not yet assigned: master guard fires first.
        assert!(engine.accept(order.id, 501).await.is_err());

        engine.claim(order.id, 501).await.unwrap();
        engine.accept(order.id, 501).await.unwrap();

        // Already in progress: transition guard fires.
        let err = engine.accept(order.id, 501).await.unwrap_err();
        assert!(matches!(err, BrigadirError::Validation(_)));
    }

    #[tokio::test]
    async fn finish_requires_in_progress() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        let err = engine.finish(order.id, 501).await.unwrap_err();
        assert!(matches!(err, BrigadirError::Validation(_)));
    }

    #[tokio::test]
    async fn finish_with_zero_photos_completes() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();
        engine.accept(order.id, 501).await.unwrap();

        let order = engine.finish(order.id, 501).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(photos::list_for_order(engine.database(), order.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn photos_accumulate_without_transition() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();
        engine.accept(order.id, 501).await.unwrap();

        engine
            .add_photo(order.id, "file-1", PhotoKind::Before)
            .await
            .unwrap();
        engine
            .add_photo(order.id, "file-2", PhotoKind::After)
            .await
            .unwrap();

        let current = engine.get(order.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::InProgress);
        assert_eq!(
            photos::list_for_order(engine.database(), order.id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn photo_on_missing_order_is_not_found() {
        let (engine, _dir) = setup_engine().await;
        let err = engine
            .add_photo(404, "file-x", PhotoKind::Before)
            .await
            .unwrap_err();
        assert!(matches!(err, BrigadirError::OrderNotFound(404)));
    }

    #[tokio::test]
    async fn force_status_clears_master_on_masterless_targets() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        let cancelled = engine
            .force_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.master_id, None);
        assert_invariant(&cancelled);
    }

    #[tokio::test]
    async fn force_status_back_to_published_reopens_order() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();
        engine.claim(order.id, 501).await.unwrap();

        let reopened = engine
            .force_status(order.id, OrderStatus::Published)
            .await
            .unwrap();
        assert_eq!(reopened.status, OrderStatus::Published);
        assert_eq!(reopened.master_id, None);

        assert!(engine.claim(order.id, 502).await.is_ok());
    }

    #[tokio::test]
    async fn reassign_creates_master_user_and_assigns() {
        let (engine, _dir) = setup_engine().await;
        let order = engine.publish(&make_new_order()).await.unwrap();

        let assigned = engine.reassign(order.id, 700).await.unwrap();
        assert_eq!(assigned.master_id, Some(700));
        assert_eq!(assigned.status, OrderStatus::Assigned);

        let user = users::get_by_telegram_id(engine.database(), 700)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Some(Role::Master));
    }

    #[tokio::test]
    async fn operations_on_missing_order_are_not_found() {
        let (engine, _dir) = setup_engine().await;
        assert!(matches!(
            engine.unassign(404).await.unwrap_err(),
            BrigadirError::OrderNotFound(404)
        ));
        assert!(matches!(
            engine.force_status(404, OrderStatus::Cancelled).await.unwrap_err(),
            BrigadirError::OrderNotFound(404)
        ));
    }
}
