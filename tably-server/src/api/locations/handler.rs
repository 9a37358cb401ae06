//! Location API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Location, LocationCreate, LocationUpdate};
use crate::db::repository::{LocationRepository, RestaurantRepository, rid};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "location";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

/// GET /api/locations?restaurant_id=... - 获取餐厅的所有门店
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Location>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = LocationRepository::new(state.get_db());
    let locations = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(locations))
}

/// GET /api/locations/:id - 获取单个门店
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Location>> {
    let repo = LocationRepository::new(state.get_db());
    let location = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", id)))?;

    ensure_can_manage(&user, &location.restaurant)?;

    Ok(Json(location))
}

/// POST /api/locations - 创建门店
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<LocationCreate>,
) -> AppResult<Json<Location>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let restaurant = rid("restaurant", &payload.restaurant_id);
    ensure_can_manage(&user, &restaurant)?;

    // Parent restaurant must exist
    let restaurant_repo = RestaurantRepository::new(state.get_db());
    restaurant_repo
        .find_by_id(&payload.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::validation(format!("Restaurant {} not found", payload.restaurant_id))
        })?;

    let repo = LocationRepository::new(state.get_db());
    let location = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(location))
}

/// PUT /api/locations/:id - 更新门店
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<LocationUpdate>,
) -> AppResult<Json<Location>> {
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let repo = LocationRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let location = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(location))
}

/// DELETE /api/locations/:id - 删除门店
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = LocationRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}
