// [libs/infra/db/src/repositories/hierarchy.rs]
/*!
 * =================================================================
 * APARATO: HIERARCHY REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: RESOLUCIÓN DE IDENTIDAD Y RUTA JERÁRQUICA
 *
 * The gateway resolves an inbound API key to its full four-hop path
 * exactly once per request (`resolve_by_key_hash`); every downstream
 * engine (policy, budget, cost, ledger) then consumes that cached
 * `ResolvedIdentity` instead of re-querying the hierarchy.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{parse_datetime, parse_uuid};
use crate::TursoClient;
use libsql::{params, Row};
use tollgate_domain_models::{Agent, AgentGroup, AgentStatus, Organization, ResolvedIdentity, Workspace};

pub struct HierarchyRepository {
    database_client: TursoClient,
}

impl HierarchyRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /// Resolve an API key's SHA-256 hash to its full hierarchy path, a
    /// single four-table join so the gateway pays for this exactly once
    /// per request.
    pub async fn resolve_by_key_hash(&self, key_hash: &str) -> Result<Option<ResolvedIdentity>, DbError> {
        let conn = self.database_client.get_connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT
                    a.id, a.agent_group_id, a.name, a.status, a.created_at,
                    ag.id, ag.workspace_id, ag.name, ag.is_active, ag.created_at,
                    w.id, w.org_id, w.name, w.is_active, w.created_at,
                    o.id, o.name, o.billing_group_id, o.owner_user_id, o.credits_per_usd, o.is_active, o.created_at
                FROM api_keys k
                JOIN agents a ON k.agent_id = a.id
                JOIN agent_groups ag ON a.agent_group_id = ag.id
                JOIN workspaces w ON ag.workspace_id = w.id
                JOIN organizations o ON w.org_id = o.id
                WHERE k.key_hash = ?1 AND k.is_active = 1
                "#,
                params![key_hash],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        Ok(Some(self.map_row_to_identity(row)?))
    }

    fn map_row_to_identity(&self, row: Row) -> Result<ResolvedIdentity, DbError> {
        let status_raw: String = row.get(3)?;
        let status = match status_raw.as_str() {
            "active" => AgentStatus::Active,
            "budget_exhausted" => AgentStatus::BudgetExhausted,
            _ => AgentStatus::Disabled,
        };

        let agent = Agent {
            id: parse_uuid(&row.get::<String>(0)?)?,
            agent_group_id: parse_uuid(&row.get::<String>(1)?)?,
            name: row.get(2)?,
            status,
            created_at: parse_datetime(&row.get::<String>(4)?),
        };

        let agent_group = AgentGroup {
            id: parse_uuid(&row.get::<String>(5)?)?,
            workspace_id: parse_uuid(&row.get::<String>(6)?)?,
            name: row.get(7)?,
            is_active: row.get::<i64>(8)? != 0,
            created_at: parse_datetime(&row.get::<String>(9)?),
        };

        let workspace = Workspace {
            id: parse_uuid(&row.get::<String>(10)?)?,
            org_id: parse_uuid(&row.get::<String>(11)?)?,
            name: row.get(12)?,
            is_active: row.get::<i64>(13)? != 0,
            created_at: parse_datetime(&row.get::<String>(14)?),
        };

        let organization = Organization {
            id: parse_uuid(&row.get::<String>(15)?)?,
            name: row.get(16)?,
            billing_group_id: parse_uuid(&row.get::<String>(17)?)?,
            owner_user_id: parse_uuid(&row.get::<String>(18)?)?,
            credits_per_usd: row.get(19)?,
            is_active: row.get::<i64>(20)? != 0,
            created_at: parse_datetime(&row.get::<String>(21)?),
        };

        Ok(ResolvedIdentity { agent, agent_group, workspace, organization })
    }
}
