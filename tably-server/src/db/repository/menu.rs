//! Menu Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Menu, MenuCreate, MenuUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "menu";

#[derive(Clone)]
pub struct MenuRepository {
    base: BaseRepository,
}

impl MenuRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All menus of a restaurant ordered by sort_order
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Menu>> {
        let r = rid("restaurant", restaurant_id);
        let menus: Vec<Menu> = self
            .base
            .db()
            .query("SELECT * FROM menu WHERE restaurant = $r ORDER BY sort_order")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(menus)
    }

    /// Active menus of a restaurant (storefront assembly)
    pub async fn find_active_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Menu>> {
        let menus: Vec<Menu> = self
            .base
            .db()
            .query("SELECT * FROM menu WHERE restaurant = $r AND is_active = true ORDER BY sort_order")
            .bind(("r", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(menus)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Menu>> {
        let menu: Option<Menu> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(menu)
    }

    pub async fn create(&self, data: MenuCreate) -> RepoResult<Menu> {
        let menu = Menu {
            id: None,
            restaurant: rid("restaurant", &data.restaurant_id),
            name: data.name,
            description: data.description,
            schedule: data.schedule_id.as_deref().map(|s| rid("schedule", s)),
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Menu> = self.base.db().create(TABLE).content(menu).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu".to_string()))
    }

    pub async fn update(&self, id: &str, data: MenuUpdate) -> RepoResult<Menu> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu {} not found", id)))?;

        #[derive(Serialize)]
        struct MenuUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            schedule: Option<RecordId>,
            #[serde(skip_serializing_if = "Option::is_none")]
            sort_order: Option<i32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = MenuUpdateDb {
            name: data.name,
            description: data.description,
            schedule: data.schedule_id.as_deref().map(|s| rid("schedule", s)),
            sort_order: data.sort_order,
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
            .ok_or_else(|| RepoError::NotFound(format!("Menu {} not found", id)))
    }

    /// Delete a menu. Refused while courses still reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM course WHERE menu = $m GROUP ALL")
            .bind(("m", thing.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete menu with existing courses".to_string(),
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
