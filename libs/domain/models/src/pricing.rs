// [libs/domain/models/src/pricing.rs]
//! Read-only `(provider, model) -> price` mapping consumed by the cost
//! engine. Unique per `(provider, model)` (storage-level constraint).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub provider: String,
    pub model: String,
    pub input_cost_per_1k: Decimal,
    pub output_cost_per_1k: Decimal,
}
