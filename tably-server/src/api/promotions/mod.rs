//! Promotion API 模块 - 优惠活动 (deals) 和优惠码 (coupons)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/deals", get(handler::list_deals))
        .route("/api/deals/{id}", get(handler::get_deal))
        .route("/api/coupons", get(handler::list_coupons))
        .route("/api/coupons/{id}", get(handler::get_coupon));

    let write_routes = Router::new()
        .route("/api/deals", post(handler::create_deal))
        .route(
            "/api/deals/{id}",
            put(handler::update_deal).delete(handler::delete_deal),
        )
        .route("/api/coupons", post(handler::create_coupon))
        .route(
            "/api/coupons/{id}",
            put(handler::update_coupon).delete(handler::delete_coupon),
        )
        .layer(middleware::from_fn(require_permission("promotions:write")));

    read_routes.merge(write_routes)
}
