//! Custom Domain Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Verification status of a custom domain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    Pending,
    Verified,
    Failed,
}

/// Custom storefront domain for a restaurant
///
/// Verified by serving the token at
/// `http://<hostname>/.well-known/tably-verification.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    /// Stored lowercase, unique across the platform
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    pub status: DomainStatus,
    pub verified_at: Option<i64>,
    /// Failure detail from the last verification attempt
    pub last_error: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

/// Create domain payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCreate {
    pub hostname: String,
}
