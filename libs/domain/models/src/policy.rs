// [libs/domain/models/src/policy.rs]
//! A single policy row. `tollgate-core-policy` merges every active policy
//! on a request's hierarchy path into an `EffectivePolicy`.

use crate::target::Target;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub name: String,
    pub target: Target,
    /// `None` means open (no restriction contributed by this policy).
    pub allowed_models: Option<Vec<String>>,
    pub max_input_tokens: Option<i64>,
    pub max_output_tokens: Option<i64>,
    pub rpm_limit: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
