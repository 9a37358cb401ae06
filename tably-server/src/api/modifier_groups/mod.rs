//! Modifier Group API 模块

mod handler;

use axum::{Router, middleware, routing::{get, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/modifier-groups", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let write_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route(
            "/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route("/{id}/items/sort-order", put(handler::reorder_items))
        .layer(middleware::from_fn(require_permission("menus:write")));

    read_routes.merge(write_routes)
}
