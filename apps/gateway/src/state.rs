// [apps/gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: SHARED APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: COMPOSITION ROOT DE REPOSITORIOS Y MOTORES
 *
 * One `Arc`-wrapped struct threaded through every axum handler via
 * `State<AppState>`. Each repository owns its own `TursoClient` clone
 * (cheap — it only wraps an `Arc<Database>`); the ledger and budget
 * engines sit on top of the repositories that implement their storage
 * traits.
 * =================================================================
 */

use std::sync::Arc;
use tollgate_core_ledger::Ledger;
use tollgate_infra_db::repositories::{
    ApiKeyRepository, AuditRepository, BudgetRepository, CredentialRepository, HierarchyRepository,
    LedgerRepository, PolicyRepository, PricingRepository, UsageRepository,
};
use tollgate_infra_db::TursoClient;
use tollgate_infra_providers::ProviderRegistry;

#[derive(Clone)]
pub struct AppState {
    pub hierarchy_repository: Arc<HierarchyRepository>,
    pub policy_repository: Arc<PolicyRepository>,
    pub budget_repository: Arc<BudgetRepository>,
    pub pricing_repository: Arc<PricingRepository>,
    pub usage_repository: Arc<UsageRepository>,
    pub audit_repository: Arc<AuditRepository>,
    pub credential_repository: Arc<CredentialRepository>,
    pub api_key_repository: Arc<ApiKeyRepository>,
    pub ledger: Arc<Ledger<LedgerRepository>>,
    pub provider_registry: Arc<ProviderRegistry>,
}

impl AppState {
    pub fn new(database_client: TursoClient, provider_registry: ProviderRegistry) -> Self {
        Self {
            hierarchy_repository: Arc::new(HierarchyRepository::new(database_client.clone())),
            policy_repository: Arc::new(PolicyRepository::new(database_client.clone())),
            budget_repository: Arc::new(BudgetRepository::new(database_client.clone())),
            pricing_repository: Arc::new(PricingRepository::new(database_client.clone())),
            usage_repository: Arc::new(UsageRepository::new(database_client.clone())),
            audit_repository: Arc::new(AuditRepository::new(database_client.clone())),
            credential_repository: Arc::new(CredentialRepository::new(database_client.clone())),
            api_key_repository: Arc::new(ApiKeyRepository::new(database_client.clone())),
            ledger: Arc::new(Ledger::new(LedgerRepository::new(database_client))),
            provider_registry: Arc::new(provider_registry),
        }
    }
}
