//! Analytics API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::RestaurantRepository;
use crate::services::analytics::{AnalyticsService, FranchiseSummary, RestaurantSummary};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Window start, Unix millis (inclusive)
    pub from: i64,
    /// Window end, Unix millis (exclusive)
    pub to: i64,
}

fn check_range(query: &RangeQuery) -> AppResult<()> {
    if query.from >= query.to {
        return Err(AppError::validation("'from' must be before 'to'"));
    }
    Ok(())
}

/// GET /api/analytics/restaurants/:id/summary?from=&to= - 单店汇总
pub async fn restaurant_summary(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<RestaurantSummary>> {
    check_range(&query)?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    let restaurant = restaurant_repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))?;

    if let Some(rid) = &restaurant.id {
        ensure_can_manage(&user, rid)?;
    }

    let service = AnalyticsService::new(state.get_db());
    let summary = service
        .restaurant_summary(&restaurant, query.from, query.to)
        .await?;
    Ok(Json(summary))
}

/// GET /api/analytics/franchise/:code/summary?from=&to= - 连锁汇总
///
/// 非管理员只能看到自己名下餐厅的分行数据；汇总数字也只覆盖可见部分。
pub async fn franchise_summary(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(code): Path<String>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<FranchiseSummary>> {
    check_range(&query)?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    let restaurants = restaurant_repo
        .find_by_franchise(&code)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    if restaurants.is_empty() {
        return Err(AppError::not_found(format!(
            "No restaurants with franchise code '{}'",
            code
        )));
    }

    // Filter to the caller's scope
    let visible: Vec<_> = restaurants
        .into_iter()
        .filter(|r| {
            r.id.as_ref()
                .map(|id| user.can_manage(&id.to_string()))
                .unwrap_or(false)
        })
        .collect();

    if visible.is_empty() {
        return Err(AppError::forbidden(format!(
            "No access to franchise '{}'",
            code
        )));
    }

    let service = AnalyticsService::new(state.get_db());
    let summary = service
        .franchise_summary(&code, &visible, query.from, query.to)
        .await?;
    Ok(Json(summary))
}
