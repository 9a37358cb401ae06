//! Onboarding Repository
//!
//! Step transitions live here; the handler only maps errors. The
//! workflow row is created alongside the restaurant and reset in place.

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Onboarding, OnboardingStep, StepState, StepStatus};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "onboarding";

#[derive(Clone)]
pub struct OnboardingRepository {
    base: BaseRepository,
}

impl OnboardingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Option<Onboarding>> {
        let r = rid("restaurant", restaurant_id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM onboarding WHERE restaurant = $r LIMIT 1")
            .bind(("r", r))
            .await?;
        let workflows: Vec<Onboarding> = result.take(0)?;
        Ok(workflows.into_iter().next())
    }

    /// Create the workflow for a new restaurant
    pub async fn create_for(&self, restaurant: &RecordId) -> RepoResult<Onboarding> {
        let workflow = Onboarding::new_for(restaurant.clone(), now_millis());
        let created: Option<Onboarding> = self.base.db().create(TABLE).content(workflow).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create onboarding workflow".to_string()))
    }

    /// Mark a step completed or skipped
    ///
    /// Rules enforced here:
    /// - mandatory steps (`profile`, `launch`) may not be skipped
    /// - `launch` may not complete while earlier steps are pending
    pub async fn set_step(
        &self,
        restaurant_id: &str,
        step: OnboardingStep,
        status: StepStatus,
    ) -> RepoResult<Onboarding> {
        let mut workflow = self
            .find_by_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Onboarding workflow for restaurant {} not found",
                    restaurant_id
                ))
            })?;

        if status == StepStatus::Skipped && step.is_mandatory() {
            return Err(RepoError::Validation(format!(
                "Step {:?} cannot be skipped",
                step
            )));
        }

        if step == OnboardingStep::Launch
            && status == StepStatus::Completed
            && !workflow.ready_to_launch()
        {
            return Err(RepoError::Validation(
                "Cannot launch while earlier onboarding steps are pending".to_string(),
            ));
        }

        let entry = workflow
            .steps
            .iter_mut()
            .find(|s| s.step == step)
            .ok_or_else(|| RepoError::NotFound(format!("Step {:?} not in workflow", step)))?;
        entry.status = status;
        entry.updated_at = Some(now_millis());

        self.save_steps(&workflow).await?;
        Ok(workflow)
    }

    /// Reset every step to pending
    pub async fn reset(&self, restaurant_id: &str) -> RepoResult<Onboarding> {
        let mut workflow = self
            .find_by_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Onboarding workflow for restaurant {} not found",
                    restaurant_id
                ))
            })?;

        for entry in &mut workflow.steps {
            entry.status = StepStatus::Pending;
            entry.updated_at = None;
        }

        self.save_steps(&workflow).await?;
        Ok(workflow)
    }

    async fn save_steps(&self, workflow: &Onboarding) -> RepoResult<()> {
        let id = workflow
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Onboarding row has no id".to_string()))?;

        #[derive(Serialize)]
        struct StepsDb {
            steps: Vec<StepState>,
        }

        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", id))
            .bind((
                "data",
                StepsDb {
                    steps: workflow.steps.clone(),
                },
            ))
            .await?;
        Ok(())
    }
}
