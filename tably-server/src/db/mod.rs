//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). Tables are schemaless; the
//! uniqueness constraints the dashboard depends on are declared as
//! indexes at startup so they hold even under concurrent writers.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

/// Idempotent index definitions run at every boot
const INDEX_DEFINITIONS: &[&str] = &[
    "DEFINE INDEX IF NOT EXISTS restaurant_slug ON TABLE restaurant COLUMNS slug UNIQUE",
    "DEFINE INDEX IF NOT EXISTS admin_username ON TABLE admin_user COLUMNS username UNIQUE",
    "DEFINE INDEX IF NOT EXISTS role_name ON TABLE role COLUMNS name UNIQUE",
    "DEFINE INDEX IF NOT EXISTS domain_hostname ON TABLE domain COLUMNS hostname UNIQUE",
    "DEFINE INDEX IF NOT EXISTS coupon_code ON TABLE coupon COLUMNS restaurant, code UNIQUE",
    "DEFINE INDEX IF NOT EXISTS session_jti ON TABLE device_session COLUMNS jti UNIQUE",
];

impl DbService {
    /// Open (or create) the database under `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("tably")
            .use_db("platform")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        for stmt in INDEX_DEFINITIONS {
            db.query(*stmt)
                .await
                .map_err(|e| AppError::database(format!("Failed to define index: {e}")))?;
        }

        tracing::info!(path = %db_path, "Database opened (SurrealDB/RocksDB)");

        Ok(Self { db })
    }
}
