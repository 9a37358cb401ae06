//! Onboarding API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let scoped_routes = Router::new()
        .route(
            "/api/restaurants/{id}/onboarding",
            get(handler::get_workflow),
        )
        .route(
            "/api/restaurants/{id}/onboarding/steps/{step}/complete",
            post(handler::complete_step),
        )
        .route(
            "/api/restaurants/{id}/onboarding/steps/{step}/skip",
            post(handler::skip_step),
        );

    let admin_routes = Router::new()
        .route(
            "/api/restaurants/{id}/onboarding/reset",
            post(handler::reset),
        )
        .layer(middleware::from_fn(require_admin));

    scoped_routes.merge(admin_routes)
}
