// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 * =================================================================
 */

pub mod api_key;
pub mod audit;
pub mod budget;
pub mod credential;
pub mod hierarchy;
pub mod ledger;
pub mod policy;
pub mod pricing;
pub mod usage;

pub use api_key::ApiKeyRepository;
pub use audit::AuditRepository;
pub use budget::BudgetRepository;
pub use credential::CredentialRepository;
pub use hierarchy::HierarchyRepository;
pub use ledger::LedgerRepository;
pub use policy::PolicyRepository;
pub use pricing::PricingRepository;
pub use usage::UsageRepository;

use crate::errors::DbError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::MappingError(format!("bad uuid '{raw}': {e}")))
}

pub(crate) fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
