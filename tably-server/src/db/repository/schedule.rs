//! Schedule and Schedule Template Repositories

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{
    Schedule, ScheduleBlock, ScheduleCreate, ScheduleTemplate, ScheduleTemplateCreate,
    ScheduleTemplateUpdate, ScheduleUpdate,
};
use crate::utils::time::{now_millis, parse_hhmm};
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "schedule";
const TEMPLATE_TABLE: &str = "schedule_template";

/// Validate weekly blocks: weekday range, HH:MM parse, open != close
pub fn validate_blocks(blocks: &[ScheduleBlock]) -> RepoResult<()> {
    for block in blocks {
        if block.weekday > 6 {
            return Err(RepoError::Validation(format!(
                "Invalid weekday {} (expected 0-6)",
                block.weekday
            )));
        }
        let open = parse_hhmm(&block.open)
            .map_err(|e| RepoError::Validation(e.to_string()))?;
        let close = parse_hhmm(&block.close)
            .map_err(|e| RepoError::Validation(e.to_string()))?;
        if open == close {
            return Err(RepoError::Validation(format!(
                "Block on weekday {} has zero length ({} - {})",
                block.weekday, block.open, block.close
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ScheduleRepository {
    base: BaseRepository,
}

impl ScheduleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All schedules of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Schedule>> {
        let r = rid("restaurant", restaurant_id);
        let schedules: Vec<Schedule> = self
            .base
            .db()
            .query("SELECT * FROM schedule WHERE restaurant = $r ORDER BY name")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(schedules)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Schedule>> {
        let schedule: Option<Schedule> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(schedule)
    }

    /// Resolve a set of schedule ids at once (menu assembly)
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Schedule>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids_owned: Vec<RecordId> = ids.to_vec();
        let schedules: Vec<Schedule> = self
            .base
            .db()
            .query("SELECT * FROM schedule WHERE id IN $ids")
            .bind(("ids", ids_owned))
            .await?
            .take(0)?;
        Ok(schedules)
    }

    pub async fn create(&self, data: ScheduleCreate) -> RepoResult<Schedule> {
        validate_blocks(&data.blocks)?;

        let schedule = Schedule {
            id: None,
            restaurant: rid("restaurant", &data.restaurant_id),
            name: data.name,
            blocks: data.blocks,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Schedule> = self.base.db().create(TABLE).content(schedule).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create schedule".to_string()))
    }

    pub async fn update(&self, id: &str, data: ScheduleUpdate) -> RepoResult<Schedule> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Schedule {} not found", id)))?;

        if let Some(ref blocks) = data.blocks {
            validate_blocks(blocks)?;
        }

        #[derive(Serialize)]
        struct ScheduleUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            blocks: Option<Vec<ScheduleBlock>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = ScheduleUpdateDb {
            name: data.name,
            blocks: data.blocks,
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
            .ok_or_else(|| RepoError::NotFound(format!("Schedule {} not found", id)))
    }

    /// Delete a schedule. Menus referencing it fall back to always-open.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        // Unlink menus first so the dangling reference never surfaces
        self.base
            .db()
            .query("UPDATE menu SET schedule = NONE WHERE schedule = $s")
            .bind(("s", thing.clone()))
            .await?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;

        Ok(true)
    }
}

#[derive(Clone)]
pub struct ScheduleTemplateRepository {
    base: BaseRepository,
}

impl ScheduleTemplateRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<ScheduleTemplate>> {
        let templates: Vec<ScheduleTemplate> = self
            .base
            .db()
            .query("SELECT * FROM schedule_template ORDER BY name")
            .await?
            .take(0)?;
        Ok(templates)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ScheduleTemplate>> {
        let template: Option<ScheduleTemplate> =
            self.base.db().select(rid(TEMPLATE_TABLE, id)).await?;
        Ok(template)
    }

    pub async fn create(&self, data: ScheduleTemplateCreate) -> RepoResult<ScheduleTemplate> {
        validate_blocks(&data.blocks)?;

        let template = ScheduleTemplate {
            id: None,
            name: data.name,
            description: data.description,
            blocks: data.blocks,
            created_at: now_millis(),
        };

        let created: Option<ScheduleTemplate> = self
            .base
            .db()
            .create(TEMPLATE_TABLE)
            .content(template)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create schedule template".to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        data: ScheduleTemplateUpdate,
    ) -> RepoResult<ScheduleTemplate> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Schedule template {} not found", id)))?;

        if let Some(ref blocks) = data.blocks {
            validate_blocks(blocks)?;
        }

        #[derive(Serialize)]
        struct TemplateUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            blocks: Option<Vec<ScheduleBlock>>,
        }

        let update_data = TemplateUpdateDb {
            name: data.name,
            description: data.description,
            blocks: data.blocks,
        };

        let thing = rid(TEMPLATE_TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", update_data))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Schedule template {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TEMPLATE_TABLE, id);
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
