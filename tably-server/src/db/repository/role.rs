//! Role Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Role, RoleCreate, RoleUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "role";

#[derive(Clone)]
pub struct RoleRepository {
    base: BaseRepository,
}

impl RoleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Role>> {
        let roles: Vec<Role> = self
            .base
            .db()
            .query("SELECT * FROM role ORDER BY name")
            .await?
            .take(0)?;
        Ok(roles)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        let role: Option<Role> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(role)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM role WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let roles: Vec<Role> = result.take(0)?;
        Ok(roles.into_iter().next())
    }

    pub async fn create(&self, data: RoleCreate) -> RepoResult<Role> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Role '{}' already exists",
                data.name
            )));
        }

        let role = Role {
            id: None,
            name: data.name,
            permissions: data.permissions,
            is_system: false,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Role> = self.base.db().create(TABLE).content(role).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create role".to_string()))
    }

    pub async fn update(&self, id: &str, data: RoleUpdate) -> RepoResult<Role> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Role {} not found", id)))?;

        if existing.is_system && (data.name.is_some() || data.is_active == Some(false)) {
            return Err(RepoError::Validation(
                "System role name and status cannot be changed".to_string(),
            ));
        }

        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Role '{}' already exists",
                new_name
            )));
        }

        #[derive(Serialize)]
        struct RoleUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            permissions: Option<Vec<String>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = RoleUpdateDb {
            name: data.name,
            permissions: data.permissions,
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
            .ok_or_else(|| RepoError::NotFound(format!("Role {} not found", id)))
    }

    /// Delete a role. Refused for system roles and roles still in use.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Role {} not found", id)))?;

        if existing.is_system {
            return Err(RepoError::Validation(
                "System role cannot be deleted".to_string(),
            ));
        }

        let thing = rid(TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM admin_user WHERE role = $role GROUP ALL")
            .bind(("role", thing.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete role still assigned to admin users".to_string(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
