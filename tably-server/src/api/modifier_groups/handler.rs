//! Modifier Group API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{BatchUpdateResponse, SortOrderUpdate, ensure_can_manage};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ModifierGroup, ModifierGroupCreate, ModifierGroupUpdate, ModifierItemInput};
use crate::db::repository::{ModifierGroupRepository, RestaurantRepository, rid};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "modifier_group";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

fn check_item_names(items: &[ModifierItemInput]) -> AppResult<()> {
    for item in items {
        validate_required_text(&item.name, "item name", MAX_NAME_LEN)?;
    }
    Ok(())
}

/// GET /api/modifier-groups?restaurant_id=... - 获取餐厅的所有选项组
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ModifierGroup>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = ModifierGroupRepository::new(state.get_db());
    let groups = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(groups))
}

/// GET /api/modifier-groups/:id - 获取单个选项组
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ModifierGroup>> {
    let repo = ModifierGroupRepository::new(state.get_db());
    let group = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Modifier group {} not found", id)))?;

    ensure_can_manage(&user, &group.restaurant)?;

    Ok(Json(group))
}

/// POST /api/modifier-groups - 创建选项组
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ModifierGroupCreate>,
) -> AppResult<Json<ModifierGroup>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    check_item_names(&payload.items)?;

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

    let repo = ModifierGroupRepository::new(state.get_db());
    let group = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(group))
}

/// PUT /api/modifier-groups/:id - 更新选项组
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ModifierGroupUpdate>,
) -> AppResult<Json<ModifierGroup>> {
    if let Some(ref items) = payload.items {
        check_item_names(items)?;
    }

    let repo = ModifierGroupRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Modifier group {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let group = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(group))
}

/// DELETE /api/modifier-groups/:id - 删除选项组
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ModifierGroupRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Modifier group {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

/// PUT /api/modifier-groups/:id/items/sort-order - 组内选项排序
///
/// 条目按传入顺序重排；未提及的条目保持原序排在末尾。
pub async fn reorder_items(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(updates): Json<Vec<SortOrderUpdate>>,
) -> AppResult<Json<BatchUpdateResponse>> {
    let repo = ModifierGroupRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Modifier group {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let mut updated = 0usize;
    let mut items: Vec<ModifierItemInput> = existing
        .items
        .iter()
        .map(|item| ModifierItemInput {
            id: Some(item.id.clone()),
            name: item.name.clone(),
            price_delta: item.price_delta,
            sort_order: Some(item.sort_order),
            is_active: Some(item.is_active),
        })
        .collect();

    for entry in &updates {
        let item = items
            .iter_mut()
            .find(|item| item.id.as_deref() == Some(entry.id.as_str()))
            .ok_or_else(|| {
                AppError::not_found(format!("Item {} not in group {}", entry.id, id))
            })?;
        item.sort_order = Some(entry.sort_order);
        updated += 1;
    }

    repo.update(
        &id,
        ModifierGroupUpdate {
            name: None,
            min_select: None,
            max_select: None,
            items: Some(items),
            is_active: None,
        },
    )
    .await
    .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(BatchUpdateResponse { updated }))
}
