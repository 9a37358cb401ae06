//! Dish Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Dish, DishCreate, DishUpdate};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "dish";

#[derive(Clone)]
pub struct DishRepository {
    base: BaseRepository,
}

impl DishRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All dishes of a course ordered by sort_order
    pub async fn find_by_course(&self, course_id: &str) -> RepoResult<Vec<Dish>> {
        let c = rid("course", course_id);
        let dishes: Vec<Dish> = self
            .base
            .db()
            .query("SELECT * FROM dish WHERE course = $c ORDER BY sort_order")
            .bind(("c", c))
            .await?
            .take(0)?;
        Ok(dishes)
    }

    /// Active dishes of a course (storefront assembly)
    pub async fn find_active_by_course(&self, course: &RecordId) -> RepoResult<Vec<Dish>> {
        let dishes: Vec<Dish> = self
            .base
            .db()
            .query("SELECT * FROM dish WHERE course = $c AND is_active = true ORDER BY sort_order")
            .bind(("c", course.clone()))
            .await?
            .take(0)?;
        Ok(dishes)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Dish>> {
        let dish: Option<Dish> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(dish)
    }

    pub async fn create(&self, data: DishCreate) -> RepoResult<Dish> {
        if data.price < Decimal::ZERO {
            return Err(RepoError::Validation(
                "Dish price must not be negative".to_string(),
            ));
        }

        let modifier_groups: Vec<RecordId> = data
            .modifier_groups
            .iter()
            .map(|id| rid("modifier_group", id))
            .collect();

        let dish = Dish {
            id: None,
            course: rid("course", &data.course_id),
            name: data.name,
            description: data.description,
            price: data.price,
            image: data.image,
            modifier_groups,
            dietary_tags: data.dietary_tags,
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Dish> = self.base.db().create(TABLE).content(dish).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dish".to_string()))
    }

    pub async fn update(&self, id: &str, data: DishUpdate) -> RepoResult<Dish> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dish {} not found", id)))?;

        if let Some(price) = data.price
            && price < Decimal::ZERO
        {
            return Err(RepoError::Validation(
                "Dish price must not be negative".to_string(),
            ));
        }

        #[derive(Serialize)]
        struct DishUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            price: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            image: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            modifier_groups: Option<Vec<RecordId>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            dietary_tags: Option<Vec<String>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            sort_order: Option<i32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = DishUpdateDb {
            name: data.name,
            description: data.description,
            price: data.price,
            image: data.image,
            modifier_groups: data
                .modifier_groups
                .map(|ids| ids.iter().map(|id| rid("modifier_group", id)).collect()),
            dietary_tags: data.dietary_tags,
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
            .ok_or_else(|| RepoError::NotFound(format!("Dish {} not found", id)))
    }

    /// Hard delete a dish (placed orders keep their snapshots)
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
