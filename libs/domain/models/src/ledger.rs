// [libs/domain/models/src/ledger.rs]
//! Append-only credit ledger row. See `tollgate-core-ledger` for the
//! invariants (L1-L3) this shape exists to support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    CreditPurchase,
    UsageDeduction,
    Adjustment,
    Refund,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub group_id: Uuid,
    /// Signed; positive = credit in, negative = deduction.
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub idempotency_key: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}
