// [libs/infra/db/src/repositories/audit.rs]
/*!
 * =================================================================
 * APARATO: AUDIT REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: RASTRO ADMINISTRATIVO DE SOLO-ANEXADO
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use libsql::params;
use tollgate_domain_models::AuditLog;

pub struct AuditRepository {
    database_client: TursoClient,
}

impl AuditRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn record(&self, entry: &AuditLog) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        let metadata_json = entry.metadata.as_ref().map(|m| m.to_string());

        conn.execute(
            "INSERT INTO audit_logs (
                id, org_id, actor_user_id, actor_agent_id, event_type,
                resource_type, resource_id, description, metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id.to_string(),
                entry.org_id.to_string(),
                entry.actor_user_id.map(|id| id.to_string()),
                entry.actor_agent_id.map(|id| id.to_string()),
                entry.event_type.clone(),
                entry.resource_type.clone(),
                entry.resource_id.clone(),
                entry.description.clone(),
                metadata_json
            ],
        )
        .await?;
        Ok(())
    }
}
