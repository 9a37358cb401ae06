//! Tablet device lifecycle types
//!
//! Shared between the server and the kitchen tablet client. The device
//! key travels in exactly two places: the registration response (once,
//! in plaintext) and the login request. The server stores only a hash.

use serde::{Deserialize, Serialize};

/// Registration response - the only time the plaintext key is returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegisteredResponse {
    pub device: DeviceInfo,
    /// Plaintext device key. Shown once; store it on the tablet.
    pub device_key: String,
}

/// Device information as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_seen_at: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

/// Device login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLoginRequest {
    pub device_id: String,
    pub device_key: String,
}

/// Device login / refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub device: DeviceInfo,
}

/// Heartbeat request - reported status is free-form ("idle", "busy", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceHeartbeatRequest {
    #[serde(default)]
    pub status: Option<String>,
}
