//! Order API Handlers (dashboard surface)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, OrderStatusUpdate};
use crate::db::repository::{OrderRepository, rid};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "order";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
    /// Optional status filter ("placed", "preparing", ...)
    pub status: Option<String>,
}

/// GET /api/orders?restaurant_id=...&status=... - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let status = match query.status.as_deref() {
        Some(slug) => Some(OrderStatus::from_slug(slug).ok_or_else(|| {
            AppError::validation(format!("Unknown order status '{}'", slug))
        })?),
        None => None,
    };

    let repo = OrderRepository::new(state.get_db());
    let orders = repo
        .find_by_restaurant(&query.restaurant_id, status)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    ensure_can_manage(&user, &order.restaurant)?;

    Ok(Json(order))
}

/// PUT /api/orders/:id/status - 推进订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    ensure_can_manage(&user, &order.restaurant)?;

    let updated = repo
        .update_status(&id, payload.status)
        .await
        .map_err(|e| match e {
            // Bad transitions are business rules, not malformed input
            crate::db::repository::RepoError::Validation(msg) => AppError::business_rule(msg),
            other => AppError::from(other),
        })?;

    state.bump_version(RESOURCE);

    Ok(Json(updated))
}
