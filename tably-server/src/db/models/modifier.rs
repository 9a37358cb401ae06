//! Modifier Group Model
//!
//! A modifier group is a named set of add-ons attachable to dishes
//! ("Toppings", "Cooking point"). Items are embedded in the group row;
//! they have no life of their own outside it.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One selectable item within a modifier group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierItem {
    /// Stable item id (uuid), referenced by cart lines and order snapshots
    pub id: String,
    pub name: String,
    /// Price adjustment added to the dish base price (may be negative)
    #[serde(default)]
    pub price_delta: Decimal,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

/// Modifier group model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroup {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub name: String,
    /// Minimum number of items a customer must select
    #[serde(default)]
    pub min_select: u32,
    /// Maximum number of selectable items (0 = unlimited)
    #[serde(default)]
    pub max_select: u32,
    #[serde(default)]
    pub items: Vec<ModifierItem>,
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

/// Item payload inside create/update requests
///
/// An omitted `id` means "new item" - the server assigns a uuid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierItemInput {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub price_delta: Decimal,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Create modifier group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroupCreate {
    pub restaurant_id: String,
    pub name: String,
    pub min_select: Option<u32>,
    pub max_select: Option<u32>,
    #[serde(default)]
    pub items: Vec<ModifierItemInput>,
}

/// Update modifier group payload
///
/// When `items` is present the whole item list is replaced; items that
/// keep their id keep their identity in existing order snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_select: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_select: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ModifierItemInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
