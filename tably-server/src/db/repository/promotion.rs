//! Deal and Coupon Repositories

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{
    AdjustmentType, Coupon, CouponCreate, CouponUpdate, Deal, DealCreate, DealScope, DealUpdate,
};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const DEAL_TABLE: &str = "deal";
const COUPON_TABLE: &str = "coupon";

/// Adjustment invariant shared by deals and coupons:
/// percentages stay in (0, 100], fixed amounts stay positive.
fn check_adjustment(adjustment_type: &AdjustmentType, value: Decimal) -> RepoResult<()> {
    match adjustment_type {
        AdjustmentType::Percentage => {
            if value <= Decimal::ZERO || value > Decimal::from(100) {
                return Err(RepoError::Validation(format!(
                    "Percentage adjustment must be in (0, 100], got {}",
                    value
                )));
            }
        }
        AdjustmentType::FixedAmount => {
            if value <= Decimal::ZERO {
                return Err(RepoError::Validation(format!(
                    "Fixed adjustment must be positive, got {}",
                    value
                )));
            }
        }
    }
    Ok(())
}

/// Map a scope + target string to the target's table
fn target_record(scope: &DealScope, target: Option<&str>) -> RepoResult<Option<RecordId>> {
    let table = match scope {
        DealScope::Global => return Ok(None),
        DealScope::Menu => "menu",
        DealScope::Course => "course",
        DealScope::Dish => "dish",
    };
    match target {
        Some(t) => Ok(Some(rid(table, t))),
        None => Err(RepoError::Validation(format!(
            "{}-scoped deal requires a target",
            table
        ))),
    }
}

// =============================================================================
// Deals
// =============================================================================

#[derive(Clone)]
pub struct DealRepository {
    base: BaseRepository,
}

impl DealRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All deals of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Deal>> {
        let r = rid("restaurant", restaurant_id);
        let deals: Vec<Deal> = self
            .base
            .db()
            .query("SELECT * FROM deal WHERE restaurant = $r ORDER BY priority DESC, name")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(deals)
    }

    /// Active deals of a restaurant (quoting)
    pub async fn find_active_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Deal>> {
        let deals: Vec<Deal> = self
            .base
            .db()
            .query("SELECT * FROM deal WHERE restaurant = $r AND is_active = true ORDER BY priority DESC")
            .bind(("r", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(deals)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Deal>> {
        let deal: Option<Deal> = self.base.db().select(rid(DEAL_TABLE, id)).await?;
        Ok(deal)
    }

    pub async fn create(&self, data: DealCreate) -> RepoResult<Deal> {
        check_adjustment(&data.adjustment_type, data.adjustment_value)?;
        let target = target_record(&data.scope, data.target.as_deref())?;

        let deal = Deal {
            id: None,
            restaurant: rid("restaurant", &data.restaurant_id),
            name: data.name,
            description: data.description,
            scope: data.scope,
            target,
            adjustment_type: data.adjustment_type,
            adjustment_value: data.adjustment_value,
            window: data.window,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_stackable: data.is_stackable.unwrap_or(false),
            priority: data.priority.unwrap_or(0),
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Deal> = self.base.db().create(DEAL_TABLE).content(deal).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create deal".to_string()))
    }

    pub async fn update(&self, id: &str, data: DealUpdate) -> RepoResult<Deal> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Deal {} not found", id)))?;

        let adjustment_type = data
            .adjustment_type
            .clone()
            .unwrap_or_else(|| existing.adjustment_type.clone());
        let adjustment_value = data.adjustment_value.unwrap_or(existing.adjustment_value);
        check_adjustment(&adjustment_type, adjustment_value)?;

        let scope = data.scope.clone().unwrap_or_else(|| existing.scope.clone());
        let target = if data.scope.is_some() || data.target.is_some() {
            // Scope or target changed - re-resolve against the new pair
            let target_str = data
                .target
                .clone()
                .or_else(|| existing.target.as_ref().map(|t| t.to_string()));
            target_record(&scope, target_str.as_deref())?
        } else {
            existing.target.clone()
        };

        #[derive(Serialize)]
        struct DealUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            scope: Option<DealScope>,
            #[serde(skip_serializing_if = "Option::is_none")]
            target: Option<RecordId>,
            #[serde(skip_serializing_if = "Option::is_none")]
            adjustment_type: Option<AdjustmentType>,
            #[serde(skip_serializing_if = "Option::is_none")]
            adjustment_value: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            window: Option<crate::db::models::WeeklyWindow>,
            #[serde(skip_serializing_if = "Option::is_none")]
            valid_from: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            valid_until: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_stackable: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            priority: Option<i32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = DealUpdateDb {
            name: data.name,
            description: data.description,
            scope: data.scope,
            target,
            adjustment_type: data.adjustment_type,
            adjustment_value: data.adjustment_value,
            window: data.window,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_stackable: data.is_stackable,
            priority: data.priority,
            is_active: data.is_active,
        };

        let thing = rid(DEAL_TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", update_data))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Deal {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(DEAL_TABLE, id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

// =============================================================================
// Coupons
// =============================================================================

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All coupons of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Coupon>> {
        let r = rid("restaurant", restaurant_id);
        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE restaurant = $r ORDER BY code")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(coupons)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Coupon>> {
        let coupon: Option<Coupon> = self.base.db().select(rid(COUPON_TABLE, id)).await?;
        Ok(coupon)
    }

    /// Case-insensitive code lookup within a restaurant
    pub async fn find_by_code(
        &self,
        restaurant: &RecordId,
        code: &str,
    ) -> RepoResult<Option<Coupon>> {
        let code_upper = code.trim().to_uppercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE restaurant = $r AND code = $code LIMIT 1")
            .bind(("r", restaurant.clone()))
            .bind(("code", code_upper))
            .await?;
        let coupons: Vec<Coupon> = result.take(0)?;
        Ok(coupons.into_iter().next())
    }

    pub async fn create(&self, data: CouponCreate) -> RepoResult<Coupon> {
        check_adjustment(&data.adjustment_type, data.adjustment_value)?;

        let restaurant = rid("restaurant", &data.restaurant_id);
        let code = data.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(RepoError::Validation("Coupon code must not be empty".to_string()));
        }
        if self.find_by_code(&restaurant, &code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Coupon code '{}' already exists",
                code
            )));
        }

        let coupon = Coupon {
            id: None,
            restaurant,
            code,
            adjustment_type: data.adjustment_type,
            adjustment_value: data.adjustment_value,
            min_subtotal: data.min_subtotal,
            max_redemptions: data.max_redemptions,
            redeemed_count: 0,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Coupon> = self.base.db().create(COUPON_TABLE).content(coupon).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
    }

    pub async fn update(&self, id: &str, data: CouponUpdate) -> RepoResult<Coupon> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id)))?;

        let adjustment_type = data
            .adjustment_type
            .clone()
            .unwrap_or_else(|| existing.adjustment_type.clone());
        let adjustment_value = data.adjustment_value.unwrap_or(existing.adjustment_value);
        check_adjustment(&adjustment_type, adjustment_value)?;

        #[derive(Serialize)]
        struct CouponUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            adjustment_type: Option<AdjustmentType>,
            #[serde(skip_serializing_if = "Option::is_none")]
            adjustment_value: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            min_subtotal: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_redemptions: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            valid_from: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            valid_until: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = CouponUpdateDb {
            adjustment_type: data.adjustment_type,
            adjustment_value: data.adjustment_value,
            min_subtotal: data.min_subtotal,
            max_redemptions: data.max_redemptions,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_active: data.is_active,
        };

        let thing = rid(COUPON_TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", update_data))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id)))
    }

    /// Increment the redemption counter (order placement)
    pub async fn record_redemption(&self, coupon: &Coupon) -> RepoResult<()> {
        if let Some(id) = &coupon.id {
            self.base
                .db()
                .query("UPDATE $thing SET redeemed_count += 1")
                .bind(("thing", id.clone()))
                .await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(COUPON_TABLE, id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
