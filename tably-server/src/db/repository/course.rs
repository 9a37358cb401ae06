//! Course Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Course, CourseCreate, CourseUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "course";

#[derive(Clone)]
pub struct CourseRepository {
    base: BaseRepository,
}

impl CourseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All courses of a menu ordered by sort_order
    pub async fn find_by_menu(&self, menu_id: &str) -> RepoResult<Vec<Course>> {
        let m = rid("menu", menu_id);
        let courses: Vec<Course> = self
            .base
            .db()
            .query("SELECT * FROM course WHERE menu = $m ORDER BY sort_order")
            .bind(("m", m))
            .await?
            .take(0)?;
        Ok(courses)
    }

    /// Active courses of a menu (storefront assembly)
    pub async fn find_active_by_menu(&self, menu: &RecordId) -> RepoResult<Vec<Course>> {
        let courses: Vec<Course> = self
            .base
            .db()
            .query("SELECT * FROM course WHERE menu = $m AND is_active = true ORDER BY sort_order")
            .bind(("m", menu.clone()))
            .await?
            .take(0)?;
        Ok(courses)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Course>> {
        let course: Option<Course> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(course)
    }

    pub async fn create(&self, data: CourseCreate) -> RepoResult<Course> {
        let course = Course {
            id: None,
            menu: rid("menu", &data.menu_id),
            name: data.name,
            description: data.description,
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Course> = self.base.db().create(TABLE).content(course).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create course".to_string()))
    }

    pub async fn update(&self, id: &str, data: CourseUpdate) -> RepoResult<Course> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Course {} not found", id)))?;

        #[derive(Serialize)]
        struct CourseUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            sort_order: Option<i32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = CourseUpdateDb {
            name: data.name,
            description: data.description,
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
            .ok_or_else(|| RepoError::NotFound(format!("Course {} not found", id)))
    }

    /// Delete a course. Refused while dishes still reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM dish WHERE course = $c GROUP ALL")
            .bind(("c", thing.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete course with existing dishes".to_string(),
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
