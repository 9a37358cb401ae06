//! Device API Handlers
//!
//! Two surfaces share this module: the dashboard's device lifecycle
//! management under `/api/devices`, and the tablet-facing endpoints
//! under `/api/device` authenticated by device tokens.

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ensure_can_manage;
use crate::auth::{CurrentDevice, CurrentUser, generate_device_key};
use crate::core::ServerState;
use crate::db::models::{Device, DeviceCreate, DeviceUpdate, Order, OrderStatusUpdate};
use crate::db::repository::{DeviceRepository, OrderRepository, RestaurantRepository, rid};
use crate::security_log;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

use shared::device::{
    DeviceHeartbeatRequest, DeviceInfo, DeviceLoginRequest, DeviceLoginResponse,
    DeviceRegisteredResponse,
};

const RESOURCE: &str = "device";
const ORDER_RESOURCE: &str = "order";

/// Fixed delay for device authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn device_info(device: &Device) -> DeviceInfo {
    DeviceInfo {
        id: device
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        restaurant_id: device.restaurant.to_string(),
        name: device.name.clone(),
        kind: match device.kind {
            crate::db::models::DeviceKind::Kitchen => "kitchen".to_string(),
            crate::db::models::DeviceKind::FrontOfHouse => "front_of_house".to_string(),
        },
        status: device.status.clone(),
        last_seen_at: device.last_seen_at,
        is_active: device.is_active,
        created_at: device.created_at,
    }
}

// =============================================================================
// Dashboard surface: /api/devices
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: String,
}

/// GET /api/devices?restaurant_id=... - 获取餐厅的所有设备
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DeviceInfo>>> {
    ensure_can_manage(&user, &rid("restaurant", &query.restaurant_id))?;

    let repo = DeviceRepository::new(state.get_db());
    let devices = repo
        .find_by_restaurant(&query.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(devices.iter().map(device_info).collect()))
}

/// GET /api/devices/:id - 获取单个设备
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<DeviceInfo>> {
    let repo = DeviceRepository::new(state.get_db());
    let device = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", id)))?;

    ensure_can_manage(&user, &device.restaurant)?;

    Ok(Json(device_info(&device)))
}

/// POST /api/devices - 注册设备
///
/// 设备密钥只在这个响应中以明文出现一次；服务端只保存 argon2 哈希。
pub async fn register(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DeviceCreate>,
) -> AppResult<Json<DeviceRegisteredResponse>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    ensure_can_manage(&user, &rid("restaurant", &payload.restaurant_id))?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    restaurant_repo
        .find_by_id(&payload.restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::validation(format!("Restaurant {} not found", payload.restaurant_id))
        })?;

    let device_key = generate_device_key()?;
    let key_hash = Device::hash_key(&device_key)
        .map_err(|e| AppError::internal(format!("Key hashing failed: {}", e)))?;

    let repo = DeviceRepository::new(state.get_db());
    let device = repo
        .create(payload, key_hash)
        .await
        .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    tracing::info!(
        device_id = %device.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        name = %device.name,
        "Device registered"
    );

    Ok(Json(DeviceRegisteredResponse {
        device: device_info(&device),
        device_key,
    }))
}

/// PUT /api/devices/:id - 更新设备
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DeviceUpdate>,
) -> AppResult<Json<DeviceInfo>> {
    let repo = DeviceRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let device = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(device_info(&device)))
}

/// POST /api/devices/:id/revoke - 撤销设备的所有会话
pub async fn revoke(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = DeviceRepository::new(state.get_db());
    let device = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", id)))?;
    ensure_can_manage(&user, &device.restaurant)?;

    let device_id = device
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Device row has no id"))?;
    let revoked = repo
        .revoke_sessions(&device_id)
        .await
        .map_err(AppError::from)?;

    security_log!(
        "INFO",
        "device_sessions_revoked",
        device_id = device_id.to_string(),
        revoked_by = user.username.clone(),
        count = revoked
    );

    state.bump_version(RESOURCE);

    Ok(Json(serde_json::json!({ "revoked_sessions": revoked })))
}

/// DELETE /api/devices/:id - 删除设备 (连同其会话)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DeviceRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}

// =============================================================================
// Tablet surface: /api/device
// =============================================================================

/// POST /api/device/login - 设备登录
pub async fn device_login(
    State(state): State<ServerState>,
    Json(req): Json<DeviceLoginRequest>,
) -> AppResult<Json<DeviceLoginResponse>> {
    let repo = DeviceRepository::new(state.get_db());
    let device = repo
        .find_by_id(&req.device_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let device = match device {
        Some(d) => d,
        None => {
            security_log!("WARN", "device_login_failed", device_id = req.device_id.clone());
            return Err(AppError::invalid("Invalid device credentials"));
        }
    };

    if !device.is_active {
        return Err(AppError::forbidden("Device has been disabled"));
    }

    let key_valid = device
        .verify_key(&req.device_key)
        .map_err(|e| AppError::internal(format!("Key verification failed: {}", e)))?;
    if !key_valid {
        security_log!("WARN", "device_login_failed", device_id = req.device_id.clone());
        return Err(AppError::invalid("Invalid device credentials"));
    }

    let device_id = device
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Device row has no id"))?;

    // Opportunistic cleanup: logins are rare enough to piggyback on
    repo.purge_expired_sessions()
        .await
        .map_err(AppError::from)?;

    let jti = Uuid::new_v4().to_string();
    let jwt_service = state.get_jwt_service();
    let (token, expires_at) = jwt_service
        .generate_device_token(
            &device_id.to_string(),
            &device.name,
            &device.restaurant.to_string(),
            &jti,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    repo.create_session(&device_id, jti, now_millis(), expires_at)
        .await
        .map_err(AppError::from)?;

    repo.record_heartbeat(&device_id, Some("online".to_string()))
        .await
        .map_err(AppError::from)?;

    tracing::info!(device_id = %device_id, name = %device.name, "Device logged in");

    Ok(Json(DeviceLoginResponse {
        token,
        expires_in: (expires_at - now_millis()) / 1000,
        device: device_info(&device),
    }))
}

/// POST /api/device/heartbeat - 心跳
pub async fn heartbeat(
    State(state): State<ServerState>,
    Extension(device): Extension<CurrentDevice>,
    Json(req): Json<DeviceHeartbeatRequest>,
) -> AppResult<Json<DeviceInfo>> {
    let repo = DeviceRepository::new(state.get_db());
    let device_id = rid("device", &device.id);

    repo.record_heartbeat(&device_id, req.status)
        .await
        .map_err(AppError::from)?;

    let fresh = repo
        .find_by_id(&device.id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", device.id)))?;

    Ok(Json(device_info(&fresh)))
}

/// POST /api/device/refresh - 轮换设备会话
///
/// 旧会话立即撤销，新令牌替换它。
pub async fn refresh(
    State(state): State<ServerState>,
    Extension(device): Extension<CurrentDevice>,
) -> AppResult<Json<DeviceLoginResponse>> {
    let repo = DeviceRepository::new(state.get_db());
    let fresh = repo
        .find_by_id(&device.id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Device {} not found", device.id)))?;

    if !fresh.is_active {
        return Err(AppError::forbidden("Device has been disabled"));
    }

    let device_id = fresh
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Device row has no id"))?;

    // Rotate: revoke everything outstanding, then issue a new session
    repo.revoke_sessions(&device_id)
        .await
        .map_err(AppError::from)?;

    let jti = Uuid::new_v4().to_string();
    let jwt_service = state.get_jwt_service();
    let (token, expires_at) = jwt_service
        .generate_device_token(
            &device_id.to_string(),
            &fresh.name,
            &fresh.restaurant.to_string(),
            &jti,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    repo.create_session(&device_id, jti, now_millis(), expires_at)
        .await
        .map_err(AppError::from)?;

    Ok(Json(DeviceLoginResponse {
        token,
        expires_in: (expires_at - now_millis()) / 1000,
        device: device_info(&fresh),
    }))
}

/// GET /api/device/orders - 本餐厅的未完结订单 (厨房工作队列)
pub async fn active_orders(
    State(state): State<ServerState>,
    Extension(device): Extension<CurrentDevice>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.get_db());
    let restaurant = rid("restaurant", &device.restaurant_id);
    let orders = repo
        .find_active_by_restaurant(&restaurant)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}

/// PUT /api/device/orders/:id/status - 设备推进订单状态
pub async fn update_order_status(
    State(state): State<ServerState>,
    Extension(device): Extension<CurrentDevice>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.get_db());
    let order = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    // A tablet only touches its own restaurant's orders
    if order.restaurant != rid("restaurant", &device.restaurant_id) {
        return Err(AppError::forbidden("Order belongs to a different restaurant"));
    }

    let updated = repo
        .update_status(&id, payload.status)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Validation(msg) => AppError::business_rule(msg),
            other => AppError::from(other),
        })?;

    state.bump_version(ORDER_RESOURCE);

    Ok(Json(updated))
}
