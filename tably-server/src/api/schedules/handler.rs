//! Schedule and Schedule Template API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    ApplyTemplateRequest, Schedule, ScheduleCreate, ScheduleTemplate, ScheduleTemplateCreate,
    ScheduleTemplateUpdate, ScheduleUpdate,
};
use crate::db::repository::{
    RestaurantRepository, ScheduleRepository, ScheduleTemplateRepository, rid,
};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "schedule";
const TEMPLATE_RESOURCE: &str = "schedule_template";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

// =============================================================================
// Schedules
// =============================================================================

/// GET /api/schedules?restaurant_id=... - 获取餐厅的所有排班
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Schedule>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = ScheduleRepository::new(state.get_db());
    let schedules = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(schedules))
}

/// GET /api/schedules/:id - 获取单个排班
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Schedule>> {
    let repo = ScheduleRepository::new(state.get_db());
    let schedule = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Schedule {} not found", id)))?;

    ensure_can_manage(&user, &schedule.restaurant)?;

    Ok(Json(schedule))
}

/// POST /api/schedules - 创建排班
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ScheduleCreate>,
) -> AppResult<Json<Schedule>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

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

    let repo = ScheduleRepository::new(state.get_db());
    let schedule = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(schedule))
}

/// PUT /api/schedules/:id - 更新排班
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ScheduleUpdate>,
) -> AppResult<Json<Schedule>> {
    let repo = ScheduleRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Schedule {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let schedule = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(schedule))
}

/// DELETE /api/schedules/:id - 删除排班
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ScheduleRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Schedule {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

/// POST /api/restaurants/:id/schedules/apply-template - 套用排班模板
///
/// 将模板的时段复制到餐厅的新排班（或覆盖指定的现有排班）。
/// 复制后模板的改动不会再影响已生成的排班。
pub async fn apply_template(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<String>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> AppResult<Json<Schedule>> {
    let restaurant = rid("restaurant", &restaurant_id);
    ensure_can_manage(&user, &restaurant)?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    restaurant_repo
        .find_by_id(&restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", restaurant_id)))?;

    let template_repo = ScheduleTemplateRepository::new(state.get_db());
    let template = template_repo
        .find_by_id(&payload.template_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::not_found(format!("Schedule template {} not found", payload.template_id))
        })?;

    let repo = ScheduleRepository::new(state.get_db());
    let schedule = match payload.overwrite_schedule_id {
        Some(ref schedule_id) => {
            let existing = repo
                .find_by_id(schedule_id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
                .ok_or_else(|| {
                    AppError::not_found(format!("Schedule {} not found", schedule_id))
                })?;
            if existing.restaurant != restaurant {
                return Err(AppError::validation(
                    "Schedule belongs to a different restaurant",
                ));
            }
            repo.update(
                schedule_id,
                ScheduleUpdate {
                    name: payload.name,
                    blocks: Some(template.blocks),
                    is_active: None,
                },
            )
            .await
            .map_err(AppError::from)?
        }
        None => repo
            .create(ScheduleCreate {
                restaurant_id: restaurant_id.clone(),
                name: payload.name.unwrap_or_else(|| template.name.clone()),
                blocks: template.blocks,
            })
            .await
            .map_err(AppError::from)?,
    };

    state.bump_version(RESOURCE);

    Ok(Json(schedule))
}

// =============================================================================
// Schedule templates (platform-level)
// =============================================================================

/// GET /api/schedule-templates - 获取所有排班模板
pub async fn list_templates(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ScheduleTemplate>>> {
    let repo = ScheduleTemplateRepository::new(state.get_db());
    let templates = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(templates))
}

/// POST /api/schedule-templates - 创建排班模板
pub async fn create_template(
    State(state): State<ServerState>,
    Json(payload): Json<ScheduleTemplateCreate>,
) -> AppResult<Json<ScheduleTemplate>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = ScheduleTemplateRepository::new(state.get_db());
    let template = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(TEMPLATE_RESOURCE);

    Ok(Json(template))
}

/// PUT /api/schedule-templates/:id - 更新排班模板
pub async fn update_template(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ScheduleTemplateUpdate>,
) -> AppResult<Json<ScheduleTemplate>> {
    let repo = ScheduleTemplateRepository::new(state.get_db());
    let template = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(TEMPLATE_RESOURCE);

    Ok(Json(template))
}

/// DELETE /api/schedule-templates/:id - 删除排班模板
pub async fn delete_template(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ScheduleTemplateRepository::new(state.get_db());
    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(TEMPLATE_RESOURCE);
    }

    Ok(Json(result))
}
