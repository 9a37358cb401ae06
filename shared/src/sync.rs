//! Sync polling types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-resource version counters returned by `GET /api/sync/versions`
///
/// Versions increase monotonically on every mutation of the named
/// resource. A client that cached `{"menu": 4}` refetches menus when it
/// sees `{"menu": 5}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncVersions {
    pub versions: HashMap<String, u64>,
}
