//! Device API 模块
//!
//! `/api/devices/*` 是管理端的设备生命周期接口 (JWT)；
//! `/api/device/*` 是平板面的接口 (设备令牌，由
//! [`crate::auth::require_device`] 在路由装配层拦截)。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 管理端
    let read_routes = Router::new()
        .route("/api/devices", get(handler::list))
        .route("/api/devices/{id}", get(handler::get_by_id));

    let write_routes = Router::new()
        .route("/api/devices", post(handler::register))
        .route(
            "/api/devices/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route("/api/devices/{id}/revoke", post(handler::revoke))
        .layer(middleware::from_fn(require_permission("devices:write")));

    // 平板面
    let device_routes = Router::new()
        .route("/api/device/login", post(handler::device_login))
        .route("/api/device/heartbeat", post(handler::heartbeat))
        .route("/api/device/refresh", post(handler::refresh))
        .route("/api/device/orders", get(handler::active_orders))
        .route(
            "/api/device/orders/{id}/status",
            put(handler::update_order_status),
        );

    read_routes.merge(write_routes).merge(device_routes)
}
