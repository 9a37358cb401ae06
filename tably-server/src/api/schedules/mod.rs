//! Schedule API 模块
//!
//! 排班 CRUD、平台级排班模板、套用模板。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/schedules", get(handler::list))
        .route("/api/schedules/{id}", get(handler::get_by_id))
        .route("/api/schedule-templates", get(handler::list_templates));

    let write_routes = Router::new()
        .route("/api/schedules", post(handler::create))
        .route(
            "/api/schedules/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route(
            "/api/restaurants/{id}/schedules/apply-template",
            post(handler::apply_template),
        )
        .layer(middleware::from_fn(require_permission("schedules:write")));

    // 模板管理是平台级操作，仅管理员可用
    let template_routes = Router::new()
        .route("/api/schedule-templates", post(handler::create_template))
        .route(
            "/api/schedule-templates/{id}",
            put(handler::update_template).delete(handler::delete_template),
        )
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(write_routes).merge(template_routes)
}
