//! Device and Device Session Repositories

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Device, DeviceCreate, DeviceKind, DeviceSession, DeviceUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "device";
const SESSION_TABLE: &str = "device_session";

#[derive(Clone)]
pub struct DeviceRepository {
    base: BaseRepository,
}

impl DeviceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All devices of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Device>> {
        let r = rid("restaurant", restaurant_id);
        let devices: Vec<Device> = self
            .base
            .db()
            .query("SELECT * FROM device WHERE restaurant = $r ORDER BY name")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(devices)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Device>> {
        let device: Option<Device> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(device)
    }

    /// Register a device; `key_hash` is the argon2 hash of the plaintext
    /// key generated by the caller.
    ///
    /// key_hash is skip_serializing on the model, so the row is written
    /// with an explicit CREATE.
    pub async fn create(&self, data: DeviceCreate, key_hash: String) -> RepoResult<Device> {
        let mut result = self
            .base
            .db()
            .query(
                "CREATE device SET
                    restaurant = $restaurant,
                    name = $name,
                    kind = $kind,
                    key_hash = $key_hash,
                    status = 'offline',
                    last_seen_at = NONE,
                    is_active = true,
                    created_at = $created_at",
            )
            .bind(("restaurant", rid("restaurant", &data.restaurant_id)))
            .bind(("name", data.name))
            .bind(("kind", data.kind))
            .bind(("key_hash", key_hash))
            .bind(("created_at", now_millis()))
            .await?;

        let created: Vec<Device> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to register device".to_string()))
    }

    pub async fn update(&self, id: &str, data: DeviceUpdate) -> RepoResult<Device> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Device {} not found", id)))?;

        #[derive(Serialize)]
        struct DeviceUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            kind: Option<DeviceKind>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = DeviceUpdateDb {
            name: data.name,
            kind: data.kind,
            is_active: data.is_active,
        };

        let thing = rid(TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", update_data))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Device {} not found", id)))
    }

    /// Heartbeat: update reported status and last_seen_at
    pub async fn record_heartbeat(
        &self,
        device: &RecordId,
        status: Option<String>,
    ) -> RepoResult<()> {
        #[derive(Serialize)]
        struct HeartbeatDb {
            last_seen_at: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            status: Option<String>,
        }

        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", device.clone()))
            .bind((
                "data",
                HeartbeatDb {
                    last_seen_at: now_millis(),
                    status,
                },
            ))
            .await?;
        Ok(())
    }

    /// Delete a device and all of its sessions
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        self.base
            .db()
            .query("DELETE device_session WHERE device = $d")
            .bind(("d", thing.clone()))
            .await?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Persist a new session row for an issued device token
    pub async fn create_session(
        &self,
        device: &RecordId,
        jti: String,
        issued_at: i64,
        expires_at: i64,
    ) -> RepoResult<DeviceSession> {
        let session = DeviceSession {
            id: None,
            device: device.clone(),
            jti,
            issued_at,
            expires_at,
            revoked: false,
        };

        let created: Option<DeviceSession> = self
            .base
            .db()
            .create(SESSION_TABLE)
            .content(session)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create device session".to_string()))
    }

    /// Look up a session by token id
    pub async fn find_session(&self, jti: &str) -> RepoResult<Option<DeviceSession>> {
        let jti_owned = jti.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM device_session WHERE jti = $jti LIMIT 1")
            .bind(("jti", jti_owned))
            .await?;
        let sessions: Vec<DeviceSession> = result.take(0)?;
        Ok(sessions.into_iter().next())
    }

    /// Revoke every session of a device (stolen tablet, offboarding)
    pub async fn revoke_sessions(&self, device: &RecordId) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("UPDATE device_session SET revoked = true WHERE device = $d AND revoked = false RETURN AFTER")
            .bind(("d", device.clone()))
            .await?;
        let revoked: Vec<DeviceSession> = result.take(0)?;
        Ok(revoked.len() as u64)
    }

    /// Drop expired sessions (periodic cleanup)
    pub async fn purge_expired_sessions(&self) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE device_session WHERE expires_at < $now")
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }
}
