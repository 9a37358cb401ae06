//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Order, OrderStatus};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Orders of a restaurant, newest first, optionally filtered by status
    pub async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>> {
        let r = rid("restaurant", restaurant_id);
        let orders: Vec<Order> = match status {
            Some(status) => {
                self.base
                    .db()
                    .query("SELECT * FROM order WHERE restaurant = $r AND status = $status ORDER BY placed_at DESC")
                    .bind(("r", r))
                    .bind(("status", status))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM order WHERE restaurant = $r ORDER BY placed_at DESC")
                    .bind(("r", r))
                    .await?
                    .take(0)?
            }
        };
        Ok(orders)
    }

    /// Non-terminal orders, oldest first - the kitchen tablet work queue
    pub async fn find_active_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE restaurant = $r AND status NOT IN ['completed', 'cancelled'] ORDER BY placed_at")
            .bind(("r", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders placed in `[from, to)` (analytics status breakdown)
    pub async fn find_in_range(
        &self,
        restaurant: &RecordId,
        from: i64,
        to: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE restaurant = $r AND placed_at >= $from AND placed_at < $to")
            .bind(("r", restaurant.clone()))
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Completed orders placed in `[from, to)` (analytics)
    pub async fn find_completed_in_range(
        &self,
        restaurant: &RecordId,
        from: i64,
        to: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE restaurant = $r AND status = 'completed' AND placed_at >= $from AND placed_at < $to")
            .bind(("r", restaurant.clone()))
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(order)
    }

    /// Persist a priced order snapshot
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Transition order status; invalid transitions are rejected
    pub async fn update_status(&self, id: &str, to: OrderStatus) -> RepoResult<Order> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

        if !existing.status.can_transition(to) {
            return Err(RepoError::Validation(format!(
                "Cannot transition order from {:?} to {:?}",
                existing.status, to
            )));
        }

        #[derive(Serialize)]
        struct StatusDb {
            status: OrderStatus,
            updated_at: i64,
        }

        let thing = rid(TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind((
                "data",
                StatusDb {
                    status: to,
                    updated_at: now_millis(),
                },
            ))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }
}
