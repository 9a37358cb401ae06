//! Onboarding Workflow Model
//!
//! One workflow per restaurant, created with it. Steps advance
//! independently except `launch`, which requires every prior step to be
//! resolved (completed or skipped).

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Onboarding step identifiers, in workflow order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Profile,
    Locations,
    Menu,
    Schedule,
    Devices,
    Domain,
    Launch,
}

/// All steps in workflow order
pub const ALL_STEPS: &[OnboardingStep] = &[
    OnboardingStep::Profile,
    OnboardingStep::Locations,
    OnboardingStep::Menu,
    OnboardingStep::Schedule,
    OnboardingStep::Devices,
    OnboardingStep::Domain,
    OnboardingStep::Launch,
];

impl OnboardingStep {
    /// Parse from the URL path segment
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "profile" => Some(Self::Profile),
            "locations" => Some(Self::Locations),
            "menu" => Some(Self::Menu),
            "schedule" => Some(Self::Schedule),
            "devices" => Some(Self::Devices),
            "domain" => Some(Self::Domain),
            "launch" => Some(Self::Launch),
            _ => None,
        }
    }

    /// Steps that may not be skipped
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Profile | Self::Launch)
    }
}

/// Step status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Skipped,
}

/// State of one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    pub step: OnboardingStep,
    pub status: StepStatus,
    pub updated_at: Option<i64>,
}

/// Onboarding workflow row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub steps: Vec<StepState>,
    #[serde(default)]
    pub created_at: i64,
}

impl Onboarding {
    /// Fresh workflow for a newly created restaurant
    pub fn new_for(restaurant: RecordId, created_at: i64) -> Self {
        Self {
            id: None,
            restaurant,
            steps: ALL_STEPS
                .iter()
                .map(|s| StepState {
                    step: *s,
                    status: StepStatus::Pending,
                    updated_at: None,
                })
                .collect(),
            created_at,
        }
    }

    /// True when every step before `launch` is completed or skipped
    pub fn ready_to_launch(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.step != OnboardingStep::Launch)
            .all(|s| s.status != StepStatus::Pending)
    }
}
