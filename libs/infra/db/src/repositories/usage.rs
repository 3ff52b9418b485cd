// [libs/infra/db/src/repositories/usage.rs]
/*!
 * =================================================================
 * APARATO: USAGE REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO DE EVENTOS DE CONSUMO (FACTURACIÓN)
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use libsql::params;
use tollgate_domain_models::{UsageEvent, UsageStatus};

pub struct UsageRepository {
    database_client: TursoClient,
}

impl UsageRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn record(&self, event: &UsageEvent) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        conn.execute(
            "INSERT INTO usage_events (
                id, user_id, group_id, agent_id, provider, model,
                input_tokens, output_tokens, total_tokens, cost_usd,
                credits_charged, latency_ms, status, error_message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                event.id.to_string(),
                event.user_id.to_string(),
                event.group_id.to_string(),
                event.agent_id.map(|id| id.to_string()),
                event.provider.clone(),
                event.model.clone(),
                event.input_tokens,
                event.output_tokens,
                event.total_tokens,
                event.cost_usd.to_string(),
                event.credits_charged,
                event.latency_ms,
                status_to_sql(event.status),
                event.error_message.clone()
            ],
        )
        .await?;
        Ok(())
    }
}

fn status_to_sql(status: UsageStatus) -> &'static str {
    match status {
        UsageStatus::Success => "SUCCESS",
        UsageStatus::Error => "ERROR",
        UsageStatus::PolicyBlocked => "POLICY_BLOCKED",
        UsageStatus::BudgetExceeded => "BUDGET_EXCEEDED",
    }
}
