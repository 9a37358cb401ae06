//! Promotion API Handlers - deals and coupons

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Coupon, CouponCreate, CouponUpdate, Deal, DealCreate, DealUpdate, WeeklyWindow,
};
use crate::db::repository::{CouponRepository, DealRepository, RestaurantRepository, rid};
use crate::utils::time::parse_hhmm;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const DEAL_RESOURCE: &str = "deal";
const COUPON_RESOURCE: &str = "coupon";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

/// Weekly window sanity: day range and HH:MM boundaries
fn check_window(window: &Option<WeeklyWindow>) -> AppResult<()> {
    if let Some(window) = window {
        for day in &window.days {
            if *day > 6 {
                return Err(AppError::validation(format!(
                    "Invalid weekday {} (expected 0-6)",
                    day
                )));
            }
        }
        if let Some(ref start) = window.start {
            parse_hhmm(start)?;
        }
        if let Some(ref end) = window.end {
            parse_hhmm(end)?;
        }
    }
    Ok(())
}

async fn check_restaurant(state: &ServerState, restaurant_id: &str) -> AppResult<()> {
    let repo = RestaurantRepository::new(state.get_db());
    repo.find_by_id(restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Restaurant {} not found", restaurant_id)))?;
    Ok(())
}

// =============================================================================
// Deals
// =============================================================================

/// GET /api/deals?restaurant_id=... - 获取餐厅的所有优惠活动
pub async fn list_deals(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Deal>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = DealRepository::new(state.get_db());
    let deals = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(deals))
}

/// GET /api/deals/:id - 获取单个优惠活动
pub async fn get_deal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Deal>> {
    let repo = DealRepository::new(state.get_db());
    let deal = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Deal {} not found", id)))?;

    ensure_can_manage(&user, &deal.restaurant)?;

    Ok(Json(deal))
}

/// POST /api/deals - 创建优惠活动
pub async fn create_deal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DealCreate>,
) -> AppResult<Json<Deal>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_window(&payload.window)?;

    ensure_can_manage(&user, &rid("restaurant", &payload.restaurant_id))?;
    check_restaurant(&state, &payload.restaurant_id).await?;

    let repo = DealRepository::new(state.get_db());
    let deal = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(DEAL_RESOURCE);

    Ok(Json(deal))
}

/// PUT /api/deals/:id - 更新优惠活动
pub async fn update_deal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DealUpdate>,
) -> AppResult<Json<Deal>> {
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_window(&payload.window)?;

    let repo = DealRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Deal {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let deal = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(DEAL_RESOURCE);

    Ok(Json(deal))
}

/// DELETE /api/deals/:id - 删除优惠活动
pub async fn delete_deal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DealRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Deal {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(DEAL_RESOURCE);
    }

    Ok(Json(result))
}

// =============================================================================
// Coupons
// =============================================================================

/// GET /api/coupons?restaurant_id=... - 获取餐厅的所有优惠码
pub async fn list_coupons(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Coupon>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = CouponRepository::new(state.get_db());
    let coupons = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(coupons))
}

/// GET /api/coupons/:id - 获取单个优惠码
pub async fn get_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.get_db());
    let coupon = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;

    ensure_can_manage(&user, &coupon.restaurant)?;

    Ok(Json(coupon))
}

/// POST /api/coupons - 创建优惠码
pub async fn create_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;

    ensure_can_manage(&user, &rid("restaurant", &payload.restaurant_id))?;
    check_restaurant(&state, &payload.restaurant_id).await?;

    let repo = CouponRepository::new(state.get_db());
    let coupon = repo.create(payload).await.map_err(AppError::from)?;

    state.bump_version(COUPON_RESOURCE);

    Ok(Json(coupon))
}

/// PUT /api/coupons/:id - 更新优惠码
pub async fn update_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let coupon = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(COUPON_RESOURCE);

    Ok(Json(coupon))
}

/// DELETE /api/coupons/:id - 删除优惠码
pub async fn delete_coupon(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CouponRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(COUPON_RESOURCE);
    }

    Ok(Json(result))
}
