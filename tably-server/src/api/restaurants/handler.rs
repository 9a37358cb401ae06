//! Restaurant API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use crate::db::repository::{OnboardingRepository, RestaurantRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text, validate_slug,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "restaurant";

/// GET /api/restaurants - 获取当前账号可管理的餐厅
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Restaurant>>> {
    let repo = RestaurantRepository::new(state.get_db());
    let restaurants = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    // Non-admin accounts only see their assigned restaurants
    let visible = restaurants
        .into_iter()
        .filter(|r| {
            r.id.as_ref()
                .map(|id| user.can_manage(&id.to_string()))
                .unwrap_or(false)
        })
        .collect();

    Ok(Json(visible))
}

/// GET /api/restaurants/:id - 获取单个餐厅
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Restaurant>> {
    let repo = RestaurantRepository::new(state.get_db());
    let restaurant = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))?;

    if let Some(rid) = &restaurant.id {
        ensure_can_manage(&user, rid)?;
    }

    Ok(Json(restaurant))
}

/// POST /api/restaurants - 创建餐厅 (仅管理员，由路由层保证)
///
/// 同时创建餐厅的 onboarding 工作流。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<Json<Restaurant>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_slug(&payload.slug, "slug")?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let repo = RestaurantRepository::new(state.get_db());
    let restaurant = repo.create(payload).await.map_err(AppError::from)?;

    // Onboarding workflow is born with the restaurant
    if let Some(rid) = &restaurant.id {
        let onboarding_repo = OnboardingRepository::new(state.get_db());
        onboarding_repo
            .create_for(rid)
            .await
            .map_err(AppError::from)?;
    }

    state.bump_version(RESOURCE);

    Ok(Json(restaurant))
}

/// PUT /api/restaurants/:id - 更新餐厅
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<Restaurant>> {
    if let Some(ref slug) = payload.slug {
        validate_slug(slug, "slug")?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let repo = RestaurantRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))?;
    if let Some(rid) = &existing.id {
        ensure_can_manage(&user, rid)?;
    }

    let restaurant = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(restaurant))
}

/// DELETE /api/restaurants/:id - 删除餐厅 (仅管理员，由路由层保证)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = RestaurantRepository::new(state.get_db());
    repo.find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}
