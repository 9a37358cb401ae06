//! Location Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Location, LocationCreate, LocationUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "location";

#[derive(Clone)]
pub struct LocationRepository {
    base: BaseRepository,
}

impl LocationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All locations of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Location>> {
        let r = rid("restaurant", restaurant_id);
        let locations: Vec<Location> = self
            .base
            .db()
            .query("SELECT * FROM location WHERE restaurant = $r ORDER BY name")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(locations)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Location>> {
        let location: Option<Location> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(location)
    }

    pub async fn create(&self, data: LocationCreate) -> RepoResult<Location> {
        let location = Location {
            id: None,
            restaurant: rid("restaurant", &data.restaurant_id),
            name: data.name,
            address: data.address,
            phone: data.phone,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Location> = self.base.db().create(TABLE).content(location).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create location".to_string()))
    }

    pub async fn update(&self, id: &str, data: LocationUpdate) -> RepoResult<Location> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Location {} not found", id)))?;

        #[derive(Serialize)]
        struct LocationUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            address: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            phone: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = LocationUpdateDb {
            name: data.name,
            address: data.address,
            phone: data.phone,
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
            .ok_or_else(|| RepoError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
