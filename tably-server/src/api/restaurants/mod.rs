//! Restaurant API 模块
//!
//! 路径直接写全：onboarding / domains / schedules 模块也在
//! `/api/restaurants/{id}/...` 下注册子路由，nest 会与之冲突。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_admin, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 读取：分配到该餐厅的账号可用
    let read_routes = Router::new()
        .route("/api/restaurants", get(handler::list))
        .route("/api/restaurants/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("restaurants:read")));

    // 更新：需要写权限 (handler 内再做餐厅归属检查)
    let write_routes = Router::new()
        .route("/api/restaurants/{id}", put(handler::update))
        .layer(middleware::from_fn(require_permission("restaurants:write")));

    // 创建/删除租户：仅管理员可用
    let admin_routes = Router::new()
        .route("/api/restaurants", post(handler::create))
        .route("/api/restaurants/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(write_routes).merge(admin_routes)
}
