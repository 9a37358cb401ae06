//! Server Implementation
//!
//! HTTP 路由装配和服务器启动。

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::auth::{require_auth, require_device};
use crate::core::{Config, Result, ServerState};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::auth::router())
        .merge(crate::api::health::router())
        .merge(crate::api::sync::router())
        .merge(crate::api::upload::router())
        // Access control
        .merge(crate::api::admins::router())
        .merge(crate::api::roles::router())
        // Tenancy
        .merge(crate::api::restaurants::router())
        .merge(crate::api::locations::router())
        .merge(crate::api::onboarding::router())
        .merge(crate::api::domains::router())
        // Menu domain
        .merge(crate::api::menus::router())
        .merge(crate::api::courses::router())
        .merge(crate::api::dishes::router())
        .merge(crate::api::modifier_groups::router())
        // Scheduling and promotions
        .merge(crate::api::schedules::router())
        .merge(crate::api::promotions::router())
        // Devices and ordering
        .merge(crate::api::devices::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::storefront::router())
        .merge(crate::api::analytics::router())
}

/// Assemble the full application: routes, auth layers, static files,
/// CORS, compression and access logging.
pub fn build_router(state: ServerState) -> Router {
    let images_dir = state.config.uploads_dir().join("images");
    let request_timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_app()
        // 静态图片服务 (公共，只读)
        .nest_service("/api/images", ServeDir::new(images_dir))
        // 设备认证中间件 - 只拦截 /api/device/*
        .layer(middleware::from_fn_with_state(
            state.clone(),
            device_scope_middleware,
        ))
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}

/// 设备中间件装配：仅作用于 /api/device/* 路径
async fn device_scope_middleware(
    state: axum::extract::State<ServerState>,
    req: axum::extract::Request,
    next: middleware::Next,
) -> std::result::Result<axum::response::Response, crate::utils::AppError> {
    if req.uri().path().starts_with("/api/device/") {
        require_device(state, req, next).await
    } else {
        Ok(next.run(req).await)
    }
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        // Create application state if not provided
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        let app = build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Tably server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::core::ServerError::Internal(e.into()))?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| crate::core::ServerError::Internal(e.into()))?;

        Ok(())
    }
}
