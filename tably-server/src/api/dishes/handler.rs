//! Dish API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use surrealdb::RecordId;

use crate::api::{BatchUpdateResponse, SortOrderUpdate, ensure_can_manage};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Dish, DishCreate, DishUpdate};
use crate::db::repository::{
    CourseRepository, DishRepository, MenuRepository, ModifierGroupRepository, rid,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "dish";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub course_id: String,
}

/// Resolve a dish's owning restaurant through course → menu
async fn owning_restaurant(state: &ServerState, course_id: &RecordId) -> AppResult<RecordId> {
    let course_repo = CourseRepository::new(state.get_db());
    let course = course_repo
        .find_by_id(&course_id.to_string())
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Course {} not found", course_id)))?;

    let menu_repo = MenuRepository::new(state.get_db());
    let menu = menu_repo
        .find_by_id(&course.menu.to_string())
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Menu {} not found", course.menu)))?;
    Ok(menu.restaurant)
}

/// Every referenced modifier group must exist and belong to the restaurant
async fn check_modifier_groups(
    state: &ServerState,
    restaurant: &RecordId,
    group_ids: &[String],
) -> AppResult<()> {
    let group_repo = ModifierGroupRepository::new(state.get_db());
    for group_id in group_ids {
        let group = group_repo
            .find_by_id(group_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::validation(format!("Modifier group {} not found", group_id))
            })?;
        if &group.restaurant != restaurant {
            return Err(AppError::validation(format!(
                "Modifier group {} belongs to a different restaurant",
                group_id
            )));
        }
    }
    Ok(())
}

/// GET /api/dishes?course_id=... - 获取分类下的所有菜品
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Dish>>> {
    let restaurant = owning_restaurant(&state, &rid("course", &query.course_id)).await?;
    ensure_can_manage(&user, &restaurant)?;

    let repo = DishRepository::new(state.get_db());
    let dishes = repo
        .find_by_course(&query.course_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(dishes))
}

/// GET /api/dishes/:id - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Dish>> {
    let repo = DishRepository::new(state.get_db());
    let dish = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Dish {} not found", id)))?;

    let restaurant = owning_restaurant(&state, &dish.course).await?;
    ensure_can_manage(&user, &restaurant)?;

    Ok(Json(dish))
}

/// POST /api/dishes - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DishCreate>,
) -> AppResult<Json<Dish>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let restaurant = owning_restaurant(&state, &rid("course", &payload.course_id)).await?;
    ensure_can_manage(&user, &restaurant)?;
    check_modifier_groups(&state, &restaurant, &payload.modifier_groups).await?;

    let repo = DishRepository::new(state.get_db());
    let dish = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(dish))
}

/// PUT /api/dishes/:id - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DishUpdate>,
) -> AppResult<Json<Dish>> {
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let repo = DishRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Dish {} not found", id)))?;
    let restaurant = owning_restaurant(&state, &existing.course).await?;
    ensure_can_manage(&user, &restaurant)?;

    if let Some(ref group_ids) = payload.modifier_groups {
        check_modifier_groups(&state, &restaurant, group_ids).await?;
    }

    let dish = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(dish))
}

/// DELETE /api/dishes/:id - 删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DishRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Dish {} not found", id)))?;
    let restaurant = owning_restaurant(&state, &existing.course).await?;
    ensure_can_manage(&user, &restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

/// PUT /api/dishes/sort-order - 批量更新菜品排序
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(count = updates.len(), "Batch update dish sort order");

    let repo = DishRepository::new(state.get_db());
    let mut updated = 0usize;

    for entry in &updates {
        let existing = repo
            .find_by_id(&entry.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Dish {} not found (applied {} of {})",
                    entry.id,
                    updated,
                    updates.len()
                ))
            })?;
        let restaurant = owning_restaurant(&state, &existing.course).await?;
        ensure_can_manage(&user, &restaurant)?;

        repo.update(
            &entry.id,
            DishUpdate {
                name: None,
                description: None,
                price: None,
                image: None,
                modifier_groups: None,
                dietary_tags: None,
                sort_order: Some(entry.sort_order),
                is_active: None,
            },
        )
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to update dish {} (applied {} of {}): {}",
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
