// [libs/domain/models/src/budget.rs]
//! A single budget row. `tollgate-core-budget` checks every active budget
//! on a request's hierarchy path and blocks if any would be exceeded.

use crate::target::Target;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Daily,
    Monthly,
    Total,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub target: Target,
    pub period: BudgetPeriod,
    pub limit_credits: i64,
    pub auto_disable: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
