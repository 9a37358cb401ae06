//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。管理端令牌 (`token_type =
//! "access"`) 和设备令牌 (`token_type = "device"`) 共用同一套签名配置，
//! 由中间件按类型分流。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// 管理端令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 设备令牌过期时间 (分钟)
    pub device_expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(key) => key,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, using generated key", e);
                    generate_printable_jwt_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 默认 24 小时
            device_expiration_minutes: std::env::var("JWT_DEVICE_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12 * 60), // 默认 12 小时
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tably-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tably-clients".to_string()),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户或设备 ID (Subject)
    pub sub: String,
    /// 用户名 (设备令牌为设备名)
    pub username: String,
    /// 显示名
    pub display_name: String,
    /// 角色 ID
    pub role_id: String,
    /// 角色名称
    pub role_name: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 可管理的餐厅 ID 列表 (逗号分隔；空 = 不限制)
    pub restaurants: String,
    /// 令牌类型: "access" | "device"
    pub token_type: String,
    /// 设备会话 ID (仅设备令牌)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            // 如果随机数生成失败，使用固定的开发密钥
            return "TablyServerDevelopmentSecureKey2025!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }

    key
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "JWT_SECRET not set! Generating secure temporary key for development."
                );
                Ok(generate_printable_jwt_secret())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// 使用默认配置创建新的 JWT 服务
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为管理端用户生成访问令牌
    #[allow(clippy::too_many_arguments)]
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        display_name: &str,
        role_id: &str,
        role_name: &str,
        permissions: &[String],
        restaurants: &[String],
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            role_id: role_id.to_string(),
            role_name: role_name.to_string(),
            permissions: permissions.join(","),
            restaurants: restaurants.join(","),
            token_type: "access".to_string(),
            jti: None,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 为设备生成设备令牌，返回 (token, 过期时间戳毫秒)
    pub fn generate_device_token(
        &self,
        device_id: &str,
        device_name: &str,
        restaurant_id: &str,
        jti: &str,
    ) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.device_expiration_minutes);

        let claims = Claims {
            sub: device_id.to_string(),
            username: device_name.to_string(),
            display_name: device_name.to_string(),
            role_id: String::new(),
            role_name: "device".to_string(),
            permissions: String::new(),
            restaurants: restaurant_id.to_string(),
            token_type: "device".to_string(),
            jti: Some(jti.to_string()),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok((token, expiration.timestamp_millis()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求扩展。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: String,
    /// 用户名
    pub username: String,
    /// 显示名
    pub display_name: String,
    /// 角色 ID
    pub role_id: String,
    /// 角色名称
    pub role_name: String,
    /// 权限列表
    pub permissions: Vec<String>,
    /// 可管理的餐厅 ID 列表 (空 = 不限制)
    pub restaurants: Vec<String>,
}

fn split_csv(value: &str) -> Vec<String> {
    if value.is_empty() {
        vec![]
    } else {
        value.split(',').map(|s| s.to_string()).collect()
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            display_name: claims.display_name,
            role_id: claims.role_id,
            role_name: claims.role_name,
            permissions: split_csv(&claims.permissions),
            restaurants: split_csv(&claims.restaurants),
        }
    }
}

impl CurrentUser {
    /// 是否管理员
    ///
    /// 管理员角色 (`role_name == "admin"`) 拥有所有权限
    pub fn is_admin(&self) -> bool {
        self.role_name == "admin"
    }

    /// 检查是否拥有指定权限
    ///
    /// 支持通配符匹配：
    /// - `"menus:*"` 匹配 `"menus:write"`, `"menus:read"` 等
    /// - `"all"` 表示拥有所有权限
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        if self.permissions.contains(&"all".to_string()) {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            // 通配符模式，如 "menus:*" 匹配 "menus:write"
            if let Some(prefix) = p.strip_suffix(":*") {
                permission.starts_with(&format!("{}:", prefix))
            } else {
                false
            }
        })
    }

    /// 检查是否可以管理指定餐厅
    ///
    /// 管理员不受限制；其余账号受 restaurants 列表约束，
    /// 空列表表示未分配任何餐厅。
    pub fn can_manage(&self, restaurant_id: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        self.restaurants.iter().any(|r| r == restaurant_id)
    }
}

/// 当前设备上下文 (从设备令牌解析)
#[derive(Debug, Clone)]
pub struct CurrentDevice {
    /// 设备 ID ("device:xxx")
    pub id: String,
    /// 设备名
    pub name: String,
    /// 所属餐厅 ID ("restaurant:xxx")
    pub restaurant_id: String,
    /// 会话 ID
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-key-of-sufficient-length".to_string(),
            expiration_minutes: 60,
            device_expiration_minutes: 30,
            issuer: "tably-server".to_string(),
            audience: "tably-clients".to_string(),
        })
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = test_service();
        let permissions = vec!["menus:read".to_string(), "menus:write".to_string()];
        let restaurants = vec!["restaurant:abc".to_string()];

        let token = service
            .generate_token(
                "admin_user:123",
                "maria",
                "Maria",
                "role:staff",
                "staff",
                &permissions,
                &restaurants,
            )
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "admin_user:123");
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.permissions, "menus:read,menus:write");
        assert_eq!(claims.restaurants, "restaurant:abc");
    }

    #[test]
    fn test_device_token_carries_jti() {
        let service = test_service();
        let (token, expires_at) = service
            .generate_device_token("device:t1", "Kitchen 1", "restaurant:abc", "jti-1")
            .expect("Failed to generate device token");

        let claims = service.validate_token(&token).expect("validate");
        assert_eq!(claims.token_type, "device");
        assert_eq!(claims.jti.as_deref(), Some("jti-1"));
        assert!(expires_at > chrono::Utc::now().timestamp_millis());
    }

    #[test]
    fn test_current_user_permissions() {
        let user = CurrentUser {
            id: "1".to_string(),
            username: "maria".to_string(),
            display_name: "Maria".to_string(),
            role_id: "role:staff".to_string(),
            role_name: "staff".to_string(),
            permissions: vec!["menus:read".to_string(), "promotions:*".to_string()],
            restaurants: vec!["restaurant:abc".to_string()],
        };

        assert!(user.has_permission("menus:read"));
        assert!(user.has_permission("promotions:write")); // Wildcard match
        assert!(!user.has_permission("devices:write"));
        assert!(user.can_manage("restaurant:abc"));
        assert!(!user.can_manage("restaurant:other"));
    }

    #[test]
    fn test_admin_has_all_permissions() {
        let admin = CurrentUser {
            id: "1".to_string(),
            username: "root".to_string(),
            display_name: "Root".to_string(),
            role_id: "role:admin".to_string(),
            role_name: "admin".to_string(),
            permissions: vec![],
            restaurants: vec![],
        };

        assert!(admin.has_permission("menus:read"));
        assert!(admin.has_permission("devices:write"));
        assert!(admin.can_manage("restaurant:anything"));
        assert!(admin.is_admin());
    }
}
