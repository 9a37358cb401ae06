//! Sync API 模块
//!
//! 客户端轮询资源版本号，变化时才重新拉取对应集合。

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use shared::sync::SyncVersions;

async fn versions(State(state): State<ServerState>) -> Json<SyncVersions> {
    Json(SyncVersions {
        versions: state.resource_versions.snapshot(),
    })
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sync/versions", get(versions))
}
