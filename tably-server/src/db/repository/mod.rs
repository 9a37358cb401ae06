//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables. Repositories own
//! duplicate checks, referential guards and partial-update MERGE
//! queries; API handlers stay thin.

// Tenancy
pub mod location;
pub mod restaurant;

// Menu domain
pub mod course;
pub mod dish;
pub mod menu;
pub mod modifier;

// Scheduling
pub mod schedule;

// Promotions
pub mod promotion;

// Auth
pub mod admin_user;
pub mod role;

// Devices
pub mod device;

// Lifecycle
pub mod domain;
pub mod onboarding;

// Orders
pub mod order;

// Re-exports
pub use admin_user::AdminUserRepository;
pub use course::CourseRepository;
pub use device::DeviceRepository;
pub use dish::DishRepository;
pub use domain::DomainRepository;
pub use location::LocationRepository;
pub use menu::MenuRepository;
pub use modifier::ModifierGroupRepository;
pub use onboarding::OnboardingRepository;
pub use order::OrderRepository;
pub use promotion::{CouponRepository, DealRepository};
pub use restaurant::RestaurantRepository;
pub use role::RoleRepository;
pub use schedule::{ScheduleRepository, ScheduleTemplateRepository};

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// API 层传入的 id 可以是 "table:id" 也可以是裸 id；
// rid() 归一化为指定表的 RecordId。

/// Normalize an id string ("table:key" or bare "key") to a RecordId
/// in the given table.
pub fn rid(table: &str, id: &str) -> RecordId {
    if let Ok(parsed) = id.parse::<RecordId>()
        && parsed.table() == table
    {
        return parsed;
    }
    RecordId::from_table_key(table, id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
