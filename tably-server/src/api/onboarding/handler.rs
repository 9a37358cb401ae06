//! Onboarding Workflow API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Onboarding, OnboardingStep, StepStatus};
use crate::db::repository::{OnboardingRepository, rid};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "onboarding";

fn parse_step(step: &str) -> AppResult<OnboardingStep> {
    OnboardingStep::from_slug(step)
        .ok_or_else(|| AppError::validation(format!("Unknown onboarding step '{}'", step)))
}

/// GET /api/restaurants/:id/onboarding - 获取开店流程状态
pub async fn get_workflow(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<String>,
) -> AppResult<Json<Onboarding>> {
    ensure_can_manage(&user, &rid("restaurant", &restaurant_id))?;

    let repo = OnboardingRepository::new(state.get_db());
    let workflow = repo
        .find_by_restaurant(&restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Onboarding workflow for restaurant {} not found",
                restaurant_id
            ))
        })?;
    Ok(Json(workflow))
}

/// POST /api/restaurants/:id/onboarding/steps/:step/complete - 完成步骤
pub async fn complete_step(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((restaurant_id, step)): Path<(String, String)>,
) -> AppResult<Json<Onboarding>> {
    ensure_can_manage(&user, &rid("restaurant", &restaurant_id))?;
    let step = parse_step(&step)?;

    let repo = OnboardingRepository::new(state.get_db());
    let workflow = repo
        .set_step(&restaurant_id, step, StepStatus::Completed)
        .await
        .map_err(|e| match e {
            // Launch-with-pending-steps is a business rule, not bad input
            crate::db::repository::RepoError::Validation(msg) => AppError::business_rule(msg),
            other => AppError::from(other),
        })?;

    state.bump_version(RESOURCE);

    Ok(Json(workflow))
}

/// POST /api/restaurants/:id/onboarding/steps/:step/skip - 跳过步骤
pub async fn skip_step(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((restaurant_id, step)): Path<(String, String)>,
) -> AppResult<Json<Onboarding>> {
    ensure_can_manage(&user, &rid("restaurant", &restaurant_id))?;
    let step = parse_step(&step)?;

    let repo = OnboardingRepository::new(state.get_db());
    let workflow = repo
        .set_step(&restaurant_id, step, StepStatus::Skipped)
        .await
        .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(workflow))
}

/// POST /api/restaurants/:id/onboarding/reset - 重置流程 (仅管理员，由路由层保证)
pub async fn reset(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
) -> AppResult<Json<Onboarding>> {
    let repo = OnboardingRepository::new(state.get_db());
    let workflow = repo
        .reset(&restaurant_id)
        .await
        .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(workflow))
}
