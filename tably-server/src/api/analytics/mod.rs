//! Analytics API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/analytics/restaurants/{id}/summary",
            get(handler::restaurant_summary),
        )
        .route(
            "/api/analytics/franchise/{code}/summary",
            get(handler::franchise_summary),
        )
}
