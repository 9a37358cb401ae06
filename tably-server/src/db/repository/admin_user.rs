//! Admin User Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{AdminUser, AdminUserCreate, AdminUserUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "admin_user";

#[derive(Clone)]
pub struct AdminUserRepository {
    base: BaseRepository,
}

impl AdminUserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<AdminUser>> {
        let users: Vec<AdminUser> = self
            .base
            .db()
            .query("SELECT * FROM admin_user ORDER BY username")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AdminUser>> {
        let user: Option<AdminUser> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<AdminUser>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM admin_user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<AdminUser> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn create(&self, data: AdminUserCreate) -> RepoResult<AdminUser> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let hash_pass = AdminUser::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Password hashing failed: {e}")))?;

        let restaurants: Vec<RecordId> = data
            .restaurant_ids
            .iter()
            .map(|id| rid("restaurant", id))
            .collect();

        // hash_pass is skip_serializing on the model, so the row is
        // written with an explicit CREATE
        let mut result = self
            .base
            .db()
            .query(
                "CREATE admin_user SET
                    username = $username,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    role = $role,
                    restaurants = $restaurants,
                    is_system = false,
                    is_active = true,
                    created_at = $created_at",
            )
            .bind((
                "display_name",
                data.display_name.unwrap_or_else(|| data.username.clone()),
            ))
            .bind(("username", data.username))
            .bind(("hash_pass", hash_pass))
            .bind(("role", rid("role", &data.role_id)))
            .bind(("restaurants", restaurants))
            .bind(("created_at", now_millis()))
            .await?;

        let created: Vec<AdminUser> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create admin user".to_string()))
    }

    pub async fn update(&self, id: &str, data: AdminUserUpdate) -> RepoResult<AdminUser> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Admin user {} not found", id)))?;

        // System accounts keep their role and stay active
        if existing.is_system && (data.role_id.is_some() || data.is_active == Some(false)) {
            return Err(RepoError::Validation(
                "System account role and status cannot be changed".to_string(),
            ));
        }

        if let Some(ref new_username) = data.username
            && new_username != &existing.username
            && self.find_by_username(new_username).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                new_username
            )));
        }

        let hash_pass = match data.password {
            Some(ref password) => Some(
                AdminUser::hash_password(password)
                    .map_err(|e| RepoError::Database(format!("Password hashing failed: {e}")))?,
            ),
            None => None,
        };

        #[derive(Serialize)]
        struct AdminUserUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            username: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            hash_pass: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            display_name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            role: Option<RecordId>,
            #[serde(skip_serializing_if = "Option::is_none")]
            restaurants: Option<Vec<RecordId>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = AdminUserUpdateDb {
            username: data.username,
            hash_pass,
            display_name: data.display_name,
            role: data.role_id.as_deref().map(|r| rid("role", r)),
            restaurants: data
                .restaurant_ids
                .map(|ids| ids.iter().map(|id| rid("restaurant", id)).collect()),
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
            .ok_or_else(|| RepoError::NotFound(format!("Admin user {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Admin user {} not found", id)))?;

        if existing.is_system {
            return Err(RepoError::Validation(
                "System account cannot be deleted".to_string(),
            ));
        }

        let thing = rid(TABLE, id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
