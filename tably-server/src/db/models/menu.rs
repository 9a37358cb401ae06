//! Menu Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Menu model - a named collection of courses owned by a restaurant
///
/// A menu linked to a schedule is only orderable inside that schedule's
/// weekly windows; an unlinked menu is always orderable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub name: String,
    pub description: Option<String>,
    /// Availability window (schedule link)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub schedule: Option<RecordId>,
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

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub restaurant_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Schedule ID ("schedule:xxx")
    pub schedule_id: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schedule ID ("schedule:xxx")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
