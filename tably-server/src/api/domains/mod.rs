//! Custom Domain API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes =
        Router::new().route("/api/restaurants/{id}/domains", get(handler::list));

    let write_routes = Router::new()
        .route("/api/restaurants/{id}/domains", post(handler::create))
        .route("/api/domains/{id}/verify", post(handler::verify))
        .route("/api/domains/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission("domains:write")));

    read_routes.merge(write_routes)
}
