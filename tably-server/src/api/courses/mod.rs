//! Course API 模块

mod handler;

use axum::{Router, middleware, routing::{get, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/courses", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let write_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route("/sort-order", put(handler::batch_update_sort_order))
        .route(
            "/{id}",
            put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_permission("menus:write")));

    read_routes.merge(write_routes)
}
