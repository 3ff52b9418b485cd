// [libs/domain/models/src/usage.rs]
//! Append-only observability row: every gateway success, provider error,
//! and post-call budget miss is recorded here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageStatus {
    Success,
    Error,
    PolicyBlocked,
    BudgetExceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: Uuid,
    /// Billing owner (the organization's owning user).
    pub user_id: Uuid,
    /// Billing group charged — `Organization::billing_group_id`.
    pub group_id: Uuid,
    /// `None` for rows produced by the legacy `/usage` workflow (out of scope here).
    pub agent_id: Option<Uuid>,
    pub provider: String,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
    pub cost_usd: Decimal,
    pub credits_charged: i64,
    pub latency_ms: i64,
    pub status: UsageStatus,
    /// Truncated to 1024 chars by the writer, never by this shape.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
