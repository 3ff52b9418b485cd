// [libs/domain/models/src/audit.rs]
//! Append-only administrative trail. Distinct from `UsageEvent`: usage
//! records billing facts, audit records who did what.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub org_id: Uuid,
    pub actor_user_id: Option<Uuid>,
    pub actor_agent_id: Option<Uuid>,
    /// e.g. "gateway.request", "gateway.request_error", "api_key.created",
    /// "api_key.revoked", "budget.exceeded".
    pub event_type: String,
    pub resource_type: String,
    pub resource_id: String,
    pub description: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}
