//! Course API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use surrealdb::RecordId;

use crate::api::{BatchUpdateResponse, SortOrderUpdate, ensure_can_manage};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Course, CourseCreate, CourseUpdate};
use crate::db::repository::{CourseRepository, MenuRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "course";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub menu_id: String,
}

/// Resolve a course's owning restaurant through its menu
async fn owning_restaurant(state: &ServerState, menu_id: &RecordId) -> AppResult<RecordId> {
    let menu_repo = MenuRepository::new(state.get_db());
    let menu = menu_repo
        .find_by_id(&menu_id.to_string())
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Menu {} not found", menu_id)))?;
    Ok(menu.restaurant)
}

/// GET /api/courses?menu_id=... - 获取菜单的所有分类
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Course>>> {
    let repo = CourseRepository::new(state.get_db());
    let courses = repo
        .find_by_menu(&query.menu_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    if let Some(course) = courses.first() {
        let restaurant = owning_restaurant(&state, &course.menu).await?;
        ensure_can_manage(&user, &restaurant)?;
    }

    Ok(Json(courses))
}

/// GET /api/courses/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Course>> {
    let repo = CourseRepository::new(state.get_db());
    let course = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Course {} not found", id)))?;

    let restaurant = owning_restaurant(&state, &course.menu).await?;
    ensure_can_manage(&user, &restaurant)?;

    Ok(Json(course))
}

/// POST /api/courses - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CourseCreate>,
) -> AppResult<Json<Course>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    // Parent menu must exist; its restaurant decides the scope
    let menu_repo = MenuRepository::new(state.get_db());
    let menu = menu_repo
        .find_by_id(&payload.menu_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Menu {} not found", payload.menu_id)))?;
    ensure_can_manage(&user, &menu.restaurant)?;

    let repo = CourseRepository::new(state.get_db());
    let course = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(course))
}

/// PUT /api/courses/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CourseUpdate>,
) -> AppResult<Json<Course>> {
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let repo = CourseRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Course {} not found", id)))?;
    let restaurant = owning_restaurant(&state, &existing.menu).await?;
    ensure_can_manage(&user, &restaurant)?;

    let course = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(course))
}

/// DELETE /api/courses/:id - 删除分类
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CourseRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Course {} not found", id)))?;
    let restaurant = owning_restaurant(&state, &existing.menu).await?;
    ensure_can_manage(&user, &restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

/// PUT /api/courses/sort-order - 批量更新分类排序
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(count = updates.len(), "Batch update course sort order");

    let repo = CourseRepository::new(state.get_db());
    let mut updated = 0usize;

    for entry in &updates {
        let existing = repo
            .find_by_id(&entry.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Course {} not found (applied {} of {})",
                    entry.id,
                    updated,
                    updates.len()
                ))
            })?;
        let restaurant = owning_restaurant(&state, &existing.menu).await?;
        ensure_can_manage(&user, &restaurant)?;

        repo.update(
            &entry.id,
            CourseUpdate {
                name: None,
                description: None,
                sort_order: Some(entry.sort_order),
                is_active: None,
            },
        )
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to update course {} (applied {} of {}): {}",
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
