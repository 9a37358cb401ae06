//! Dish Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Dish model - a menu item within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub course: RecordId,
    pub name: String,
    pub description: Option<String>,
    /// Base price before modifiers
    pub price: Decimal,
    /// Uploaded image filename (served under /api/images)
    pub image: Option<String>,
    /// Modifier group references
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub modifier_groups: Vec<RecordId>,
    /// Free-form dietary flags ("vegan", "gluten-free", ...)
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
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

/// Create dish payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishCreate {
    pub course_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    /// Modifier group IDs ("modifier_group:xxx")
    #[serde(default)]
    pub modifier_groups: Vec<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    pub sort_order: Option<i32>,
}

/// Update dish payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Modifier group IDs ("modifier_group:xxx")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
