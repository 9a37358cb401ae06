//! Restaurant Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Restaurant ID type
pub type RestaurantId = RecordId;

/// Restaurant model - the tenant root entity
///
/// Owns menus, locations, schedules, devices, domains and promotional
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RestaurantId>,
    pub name: String,
    /// URL-safe identifier used by the storefront routes
    pub slug: String,
    pub description: Option<String>,
    /// IANA timezone name, e.g. "Europe/Madrid"
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// ISO 4217 currency code shown on the storefront
    #[serde(default = "default_currency")]
    pub currency: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Restaurants sharing a franchise code roll up in franchise analytics
    pub franchise_code: Option<String>,
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

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub franchise_code: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub franchise_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
