//! Restaurant Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "restaurant";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All restaurants, active first, then by name
    pub async fn find_all(&self) -> RepoResult<Vec<Restaurant>> {
        let restaurants: Vec<Restaurant> = self
            .base
            .db()
            .query("SELECT * FROM restaurant ORDER BY name")
            .await?
            .take(0)?;
        Ok(restaurants)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        let restaurant: Option<Restaurant> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(restaurant)
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Restaurant>> {
        let slug_owned = slug.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurant WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug_owned))
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants.into_iter().next())
    }

    /// All active restaurants sharing a franchise code
    pub async fn find_by_franchise(&self, code: &str) -> RepoResult<Vec<Restaurant>> {
        let code_owned = code.to_string();
        let restaurants: Vec<Restaurant> = self
            .base
            .db()
            .query("SELECT * FROM restaurant WHERE franchise_code = $code AND is_active = true ORDER BY name")
            .bind(("code", code_owned))
            .await?
            .take(0)?;
        Ok(restaurants)
    }

    pub async fn create(&self, data: RestaurantCreate) -> RepoResult<Restaurant> {
        if self.find_by_slug(&data.slug).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Restaurant slug '{}' already exists",
                data.slug
            )));
        }

        let restaurant = Restaurant {
            id: None,
            name: data.name,
            slug: data.slug,
            description: data.description,
            timezone: data.timezone.unwrap_or_else(|| "UTC".to_string()),
            currency: data.currency.unwrap_or_else(|| "EUR".to_string()),
            contact_email: data.contact_email,
            contact_phone: data.contact_phone,
            franchise_code: data.franchise_code,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Restaurant> = self.base.db().create(TABLE).content(restaurant).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create restaurant".to_string()))
    }

    pub async fn update(&self, id: &str, data: RestaurantUpdate) -> RepoResult<Restaurant> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Restaurant {} not found", id)))?;

        // Check duplicate slug if changing
        if let Some(ref new_slug) = data.slug
            && new_slug != &existing.slug
            && self.find_by_slug(new_slug).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Restaurant slug '{}' already exists",
                new_slug
            )));
        }

        #[derive(Serialize)]
        struct RestaurantUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            slug: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            timezone: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            currency: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            contact_email: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            contact_phone: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            franchise_code: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = RestaurantUpdateDb {
            name: data.name,
            slug: data.slug,
            description: data.description,
            timezone: data.timezone,
            currency: data.currency,
            contact_email: data.contact_email,
            contact_phone: data.contact_phone,
            franchise_code: data.franchise_code,
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
            .ok_or_else(|| RepoError::NotFound(format!("Restaurant {} not found", id)))
    }

    /// Delete a restaurant. Refused while menus still reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu WHERE restaurant = $r GROUP ALL")
            .bind(("r", thing.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete restaurant with existing menus".to_string(),
            ));
        }

        // Cascade the restaurant-owned side tables
        self.base
            .db()
            .query("DELETE location WHERE restaurant = $r")
            .query("DELETE schedule WHERE restaurant = $r")
            .query("DELETE onboarding WHERE restaurant = $r")
            .query("DELETE domain WHERE restaurant = $r")
            .bind(("r", thing.clone()))
            .await?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;

        Ok(true)
    }
}
