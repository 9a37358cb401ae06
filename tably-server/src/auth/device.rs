//! 设备认证
//!
//! 平板设备使用注册时下发的设备密钥登录，获得携带会话 ID (`jti`)
//! 的设备令牌。令牌签名有效还不够：对应的会话行必须存在且未撤销，
//! 这样被盗设备可以被管理端立即吊销。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::rand::{SecureRandom, SystemRandom};

use crate::AppError;
use crate::auth::{CurrentDevice, JwtService};
use crate::core::ServerState;
use crate::db::repository::DeviceRepository;
use crate::security_log;
use crate::utils::time::now_millis;

/// 生成 URL-safe 的设备密钥 (32 字节熵)
pub fn generate_device_key() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate device key"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// 设备认证中间件 - 保护 `/api/device/*` (除 login)
///
/// 验证步骤：
/// 1. Bearer 令牌签名有效且 `token_type == "device"`
/// 2. 令牌携带的 `jti` 在 device_session 表中存在
/// 3. 会话未撤销且未过期
///
/// 通过后将 [`CurrentDevice`] 注入请求扩展。
pub async fn require_device(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 登录接口本身不需要设备令牌
    if path == "/api/device/login" {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "device_auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let claims = match jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(crate::auth::JwtError::ExpiredToken) => return Err(AppError::token_expired()),
        Err(e) => {
            security_log!(
                "WARN",
                "device_auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            return Err(AppError::invalid_token("Invalid token"));
        }
    };

    if claims.token_type != "device" {
        return Err(AppError::invalid_token("Device token required"));
    }

    let jti = claims
        .jti
        .clone()
        .ok_or_else(|| AppError::invalid_token("Device token missing session id"))?;

    // 会话行是撤销锚点：不存在或已撤销的会话直接拒绝
    let repo = DeviceRepository::new(state.get_db());
    let session = repo
        .find_session(&jti)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::invalid_token("Session not found"))?;

    if session.revoked {
        security_log!(
            "WARN",
            "device_session_revoked",
            device_id = claims.sub.clone(),
            jti = jti.clone()
        );
        return Err(AppError::forbidden("Device session has been revoked"));
    }

    if session.expires_at < now_millis() {
        return Err(AppError::token_expired());
    }

    let device = CurrentDevice {
        id: claims.sub,
        name: claims.username,
        restaurant_id: claims.restaurants,
        jti,
    };
    req.extensions_mut().insert(device);

    Ok(next.run(req).await)
}
