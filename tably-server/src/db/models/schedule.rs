//! Schedule and Schedule Template Models

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One weekly service window
///
/// `close <= open` means the window crosses midnight (22:00–02:00).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleBlock {
    /// Day of week (0=Sunday, 1=Monday, ..., 6=Saturday)
    pub weekday: u8,
    /// Opening time (HH:MM)
    pub open: String,
    /// Closing time (HH:MM)
    pub close: String,
}

/// Schedule model - a restaurant's named weekly service hours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
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

/// Create schedule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub restaurant_id: String,
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
}

/// Update schedule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<ScheduleBlock>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Platform-level schedule template ("Lunch + Dinner", "Continuous")
///
/// Applying a template to a restaurant copies its blocks into a schedule
/// owned by that restaurant; later template edits do not propagate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
    #[serde(default)]
    pub created_at: i64,
}

/// Create schedule template payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTemplateCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ScheduleBlock>,
}

/// Update schedule template payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<ScheduleBlock>>,
}

/// Apply-template request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyTemplateRequest {
    /// Template ID ("schedule_template:xxx")
    pub template_id: String,
    /// Name for the resulting schedule (defaults to the template name)
    pub name: Option<String>,
    /// Overwrite the blocks of an existing schedule instead of creating one
    pub overwrite_schedule_id: Option<String>,
}
