//! Modifier Group Repository
//!
//! Items are embedded in the group row; create/update materialize
//! stable item uuids so order snapshots stay addressable.

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{ModifierGroup, ModifierGroupCreate, ModifierGroupUpdate, ModifierItem, ModifierItemInput};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

const TABLE: &str = "modifier_group";

/// Selection rule invariant shared by create and update
fn check_selection_rule(min_select: u32, max_select: u32) -> RepoResult<()> {
    if max_select != 0 && min_select > max_select {
        return Err(RepoError::Validation(format!(
            "min_select ({}) must not exceed max_select ({})",
            min_select, max_select
        )));
    }
    Ok(())
}

/// Materialize input items, assigning uuids to new ones
fn materialize_items(inputs: Vec<ModifierItemInput>) -> Vec<ModifierItem> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(idx, input)| ModifierItem {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: input.name,
            price_delta: input.price_delta,
            sort_order: input.sort_order.unwrap_or(idx as i32),
            is_active: input.is_active.unwrap_or(true),
        })
        .collect()
}

#[derive(Clone)]
pub struct ModifierGroupRepository {
    base: BaseRepository,
}

impl ModifierGroupRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All modifier groups of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<ModifierGroup>> {
        let r = rid("restaurant", restaurant_id);
        let groups: Vec<ModifierGroup> = self
            .base
            .db()
            .query("SELECT * FROM modifier_group WHERE restaurant = $r ORDER BY name")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(groups)
    }

    /// Resolve a set of group ids at once (menu assembly)
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<ModifierGroup>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids_owned: Vec<RecordId> = ids.to_vec();
        let groups: Vec<ModifierGroup> = self
            .base
            .db()
            .query("SELECT * FROM modifier_group WHERE id IN $ids AND is_active = true")
            .bind(("ids", ids_owned))
            .await?
            .take(0)?;
        Ok(groups)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ModifierGroup>> {
        let group: Option<ModifierGroup> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(group)
    }

    pub async fn create(&self, data: ModifierGroupCreate) -> RepoResult<ModifierGroup> {
        let min_select = data.min_select.unwrap_or(0);
        let max_select = data.max_select.unwrap_or(0);
        check_selection_rule(min_select, max_select)?;

        let group = ModifierGroup {
            id: None,
            restaurant: rid("restaurant", &data.restaurant_id),
            name: data.name,
            min_select,
            max_select,
            items: materialize_items(data.items),
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<ModifierGroup> = self.base.db().create(TABLE).content(group).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create modifier group".to_string()))
    }

    pub async fn update(&self, id: &str, data: ModifierGroupUpdate) -> RepoResult<ModifierGroup> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Modifier group {} not found", id)))?;

        let min_select = data.min_select.unwrap_or(existing.min_select);
        let max_select = data.max_select.unwrap_or(existing.max_select);
        check_selection_rule(min_select, max_select)?;

        #[derive(Serialize)]
        struct ModifierGroupUpdateDb {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            min_select: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_select: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            items: Option<Vec<ModifierItem>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
        }

        let update_data = ModifierGroupUpdateDb {
            name: data.name,
            min_select: data.min_select,
            max_select: data.max_select,
            items: data.items.map(materialize_items),
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
            .ok_or_else(|| RepoError::NotFound(format!("Modifier group {} not found", id)))
    }

    /// Delete a group. Refused while dishes still reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = rid(TABLE, id);

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM dish WHERE $g IN modifier_groups AND is_active = true GROUP ALL")
            .bind(("g", thing.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete modifier group still attached to dishes".to_string(),
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
