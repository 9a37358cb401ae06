//! Promotion Models - deals and coupons

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// What part of the menu a deal applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealScope {
    Global,
    Menu,
    Course,
    Dish,
}

/// Adjustment type shared by deals and coupons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    Percentage,
    FixedAmount,
}

/// Recurring weekly activation window for a deal
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeeklyWindow {
    /// Days of week (0=Sunday, 1=Monday, ..., 6=Saturday)
    #[serde(default)]
    pub days: Vec<u8>,
    /// Start time (HH:MM)
    pub start: Option<String>,
    /// End time (HH:MM)
    pub end: Option<String>,
}

/// Deal entity - automatic discount applied during quoting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub scope: DealScope,
    /// Target record based on scope (menu/course/dish); None for Global
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub target: Option<RecordId>,
    pub adjustment_type: AdjustmentType,
    /// Percentage (30 = 30% off) or fixed amount per line
    pub adjustment_value: Decimal,
    /// Recurring activation window; None = always on inside validity range
    pub window: Option<WeeklyWindow>,
    /// Validity range (Unix millis, inclusive start / exclusive end)
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_stackable: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create deal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealCreate {
    pub restaurant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub scope: DealScope,
    /// Target ID as string ("menu:xxx", "course:xxx", "dish:xxx")
    pub target: Option<String>,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
    pub window: Option<WeeklyWindow>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub is_stackable: Option<bool>,
    pub priority: Option<i32>,
}

/// Update deal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<DealScope>,
    /// Target ID as string ("menu:xxx", "course:xxx", "dish:xxx")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_type: Option<AdjustmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WeeklyWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_stackable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Coupon entity - customer-entered code redeemed at order placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    /// Stored uppercase; lookups are case-insensitive
    pub code: String,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
    /// Minimum post-deal subtotal for the coupon to apply
    pub min_subtotal: Option<Decimal>,
    /// Total redemption cap; None = unlimited
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub redeemed_count: u32,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub restaurant_id: String,
    pub code: String,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
    pub min_subtotal: Option<Decimal>,
    pub max_redemptions: Option<u32>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
}

/// Update coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_type: Option<AdjustmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_subtotal: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redemptions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
