//! Tablet Device and Device Session Models

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// What the device is used for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Kitchen,
    FrontOfHouse,
}

/// Kitchen tablet / front-of-house device
///
/// Authenticated with a device key whose argon2 hash is stored here;
/// the plaintext key is returned exactly once at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub name: String,
    pub kind: DeviceKind,
    #[serde(skip_serializing)]
    pub key_hash: String,
    /// Last status reported by heartbeat ("idle", "busy", ...)
    #[serde(default = "default_status")]
    pub status: String,
    pub last_seen_at: Option<i64>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

fn default_status() -> String {
    "offline".to_string()
}

/// Register device payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreate {
    pub restaurant_id: String,
    pub name: String,
    pub kind: DeviceKind,
}

/// Update device payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeviceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Device session - one row per issued device token
///
/// The token carries the `jti`; the row is the revocation anchor. A
/// revoked or missing row invalidates the token regardless of its
/// signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSession {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub device: RecordId,
    pub jti: String,
    pub issued_at: i64,
    pub expires_at: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub revoked: bool,
}

impl Device {
    /// Verify a device key against the stored argon2 hash
    pub fn verify_key(&self, key: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.key_hash)?;
        Ok(Argon2::default()
            .verify_password(key.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a device key using argon2
    pub fn hash_key(key: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2.hash_password(key.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }
}
