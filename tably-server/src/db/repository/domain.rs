//! Custom Domain Repository

use super::{BaseRepository, RepoError, RepoResult, rid};
use crate::db::models::{Domain, DomainStatus};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "domain";

#[derive(Clone)]
pub struct DomainRepository {
    base: BaseRepository,
}

impl DomainRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All domains of a restaurant
    pub async fn find_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Domain>> {
        let r = rid("restaurant", restaurant_id);
        let domains: Vec<Domain> = self
            .base
            .db()
            .query("SELECT * FROM domain WHERE restaurant = $r ORDER BY hostname")
            .bind(("r", r))
            .await?
            .take(0)?;
        Ok(domains)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Domain>> {
        let domain: Option<Domain> = self.base.db().select(rid(TABLE, id)).await?;
        Ok(domain)
    }

    pub async fn find_by_hostname(&self, hostname: &str) -> RepoResult<Option<Domain>> {
        let hostname_owned = hostname.to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM domain WHERE hostname = $hostname LIMIT 1")
            .bind(("hostname", hostname_owned))
            .await?;
        let domains: Vec<Domain> = result.take(0)?;
        Ok(domains.into_iter().next())
    }

    /// Insert a pending domain with a fresh verification token
    pub async fn create(
        &self,
        restaurant: RecordId,
        hostname: String,
        verification_token: String,
    ) -> RepoResult<Domain> {
        if self.find_by_hostname(&hostname).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Domain '{}' is already registered",
                hostname
            )));
        }

        let domain = Domain {
            id: None,
            restaurant,
            hostname,
            verification_token: Some(verification_token),
            status: DomainStatus::Pending,
            verified_at: None,
            last_error: None,
            created_at: now_millis(),
        };

        let created: Option<Domain> = self.base.db().create(TABLE).content(domain).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create domain".to_string()))
    }

    /// Record the outcome of a verification attempt
    pub async fn set_verification_result(
        &self,
        id: &str,
        status: DomainStatus,
        last_error: Option<String>,
    ) -> RepoResult<Domain> {
        #[derive(Serialize)]
        struct VerificationDb {
            status: DomainStatus,
            verified_at: Option<i64>,
            last_error: Option<String>,
        }

        let verified_at = match status {
            DomainStatus::Verified => Some(now_millis()),
            _ => None,
        };

        let thing = rid(TABLE, id);
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind((
                "data",
                VerificationDb {
                    status,
                    verified_at,
                    last_error,
                },
            ))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Domain {} not found", id)))
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
