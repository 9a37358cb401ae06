//! Storefront API 模块 (公共)

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/storefront/{slug}/menu", get(handler::menu))
        .route("/api/storefront/{slug}/quote", post(handler::quote))
        .route("/api/storefront/{slug}/orders", post(handler::place_order))
}
