// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: Tipos compartidos del dominio de facturación
 *
 * Single source of truth for the hierarchy, ledger, policy, budget,
 * and usage entities that flow through the gateway pipeline. Every
 * type here is a plain data contract — no I/O, no business rules.
 * The engines in `tollgate-core-*` own the rules; this crate only
 * owns the shapes.
 * =================================================================
 */

pub mod target;
pub mod hierarchy;
pub mod api_key;
pub mod credential;
pub mod ledger;
pub mod policy;
pub mod budget;
pub mod pricing;
pub mod usage;
pub mod audit;

pub use target::Target;
pub use hierarchy::{Agent, AgentGroup, AgentStatus, Organization, Workspace};
pub use api_key::ApiKey;
pub use credential::{CredentialMode, ProviderCredential};
pub use ledger::{LedgerEntry, TransactionType};
pub use policy::Policy;
pub use budget::{Budget, BudgetPeriod};
pub use pricing::PricingRule;
pub use usage::{UsageEvent, UsageStatus};
pub use audit::AuditLog;
