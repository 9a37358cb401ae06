//! Menu API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{BatchUpdateResponse, SortOrderUpdate, ensure_can_manage};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Menu, MenuCreate, MenuUpdate};
use crate::db::repository::{MenuRepository, RestaurantRepository, ScheduleRepository, rid};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "menu";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

/// A schedule link must point at a schedule of the same restaurant
async fn check_schedule_link(
    state: &ServerState,
    restaurant_id: &str,
    schedule_id: &str,
) -> AppResult<()> {
    let schedule_repo = ScheduleRepository::new(state.get_db());
    let schedule = schedule_repo
        .find_by_id(schedule_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Schedule {} not found", schedule_id)))?;

    if schedule.restaurant != rid("restaurant", restaurant_id) {
        return Err(AppError::validation(
            "Schedule belongs to a different restaurant",
        ));
    }
    Ok(())
}

/// GET /api/menus?restaurant_id=... - 获取餐厅的所有菜单
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Menu>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = MenuRepository::new(state.get_db());
    let menus = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(menus))
}

/// GET /api/menus/:id - 获取单个菜单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Menu>> {
    let repo = MenuRepository::new(state.get_db());
    let menu = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;

    ensure_can_manage(&user, &menu.restaurant)?;

    Ok(Json(menu))
}

/// POST /api/menus - 创建菜单
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<Json<Menu>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let restaurant = rid("restaurant", &payload.restaurant_id);
    ensure_can_manage(&user, &restaurant)?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    restaurant_repo
        .find_by_id(&payload.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::validation(format!("Restaurant {} not found", payload.restaurant_id))
        })?;

    if let Some(ref schedule_id) = payload.schedule_id {
        check_schedule_link(&state, &payload.restaurant_id, schedule_id).await?;
    }

    let repo = MenuRepository::new(state.get_db());
    let menu = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(menu))
}

/// PUT /api/menus/:id - 更新菜单
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<Menu>> {
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let repo = MenuRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    if let Some(ref schedule_id) = payload.schedule_id {
        check_schedule_link(&state, &existing.restaurant.to_string(), schedule_id).await?;
    }

    let menu = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(menu))
}

/// DELETE /api/menus/:id - 删除菜单
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = MenuRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

/// PUT /api/menus/sort-order - 批量更新菜单排序
///
/// 逐行写入；失败时返回的错误指明失败的 id，已写入的行保持生效。
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(count = updates.len(), "Batch update menu sort order");

    let repo = MenuRepository::new(state.get_db());
    let mut updated = 0usize;

    for entry in &updates {
        let existing = repo
            .find_by_id(&entry.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Menu {} not found (applied {} of {})",
                    entry.id,
                    updated,
                    updates.len()
                ))
            })?;
        ensure_can_manage(&user, &existing.restaurant)?;

        repo.update(
            &entry.id,
            MenuUpdate {
                name: None,
                description: None,
                schedule_id: None,
                sort_order: Some(entry.sort_order),
                is_active: None,
            },
        )
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to update menu {} (applied {} of {}): {}",
                entry.id,
                updated,
                updates.len(),
                e
            ))
        })?;
        updated += 1;
    }

    state.bump_version(RESOURCE);

    Ok(Json(BatchUpdateResponse { updated }))
}
