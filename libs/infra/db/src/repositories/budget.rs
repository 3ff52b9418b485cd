// [libs/infra/db/src/repositories/budget.rs]
/*!
 * =================================================================
 * APARATO: BUDGET REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: ROLLUP TRANSITIVO DE CONSUMO POR NIVEL JERÁRQUICO
 *
 * Implements `tollgate_core_budget::BudgetUsageSource`. A budget on an
 * `Org` target must see every credit spent anywhere under that org, not
 * just credits billed directly to it — so each level's query walks back
 * up from `usage_events` through `agents -> agent_groups -> workspaces`
 * as far as the target's level requires.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{parse_datetime, parse_uuid};
use crate::{columns_to_target, target_to_columns, TursoClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;
use tollgate_core_budget::BudgetUsageSource;
use tollgate_domain_models::{Budget, BudgetPeriod, Target};

pub struct BudgetRepository {
    database_client: TursoClient,
}

impl BudgetRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn create(&self, budget: &Budget) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        let (target_type, target_id) = target_to_columns(budget.target);
        conn.execute(
            "INSERT INTO budgets (id, target_type, target_id, period, limit_credits, auto_disable, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                budget.id.to_string(),
                target_type,
                target_id,
                period_to_sql(budget.period),
                budget.limit_credits,
                budget.auto_disable,
                budget.is_active
            ],
        )
        .await?;
        Ok(())
    }
}

fn period_to_sql(period: BudgetPeriod) -> &'static str {
    match period {
        BudgetPeriod::Daily => "DAILY",
        BudgetPeriod::Monthly => "MONTHLY",
        BudgetPeriod::Total => "TOTAL",
    }
}

fn period_from_sql(raw: &str) -> BudgetPeriod {
    match raw {
        "DAILY" => BudgetPeriod::Daily,
        "MONTHLY" => BudgetPeriod::Monthly,
        _ => BudgetPeriod::Total,
    }
}

#[async_trait]
impl BudgetUsageSource for BudgetRepository {
    type Error = DbError;

    async fn active_budgets(&self, path: &[Target]) -> Result<Vec<Budget>, Self::Error> {
        let conn = self.database_client.get_connection()?;
        let mut out = Vec::with_capacity(path.len());

        for target in path {
            let (target_type, target_id) = target_to_columns(*target);
            let mut rows = conn
                .query(
                    "SELECT id, target_type, target_id, period, limit_credits, auto_disable, is_active, created_at
                     FROM budgets WHERE target_type = ?1 AND target_id = ?2 AND is_active = 1",
                    params![target_type, target_id],
                )
                .await?;

            while let Some(row) = rows.next().await? {
                let target = columns_to_target(&row.get::<String>(1)?, &row.get::<String>(2)?)?;
                out.push(Budget {
                    id: parse_uuid(&row.get::<String>(0)?)?,
                    target,
                    period: period_from_sql(&row.get::<String>(3)?),
                    limit_credits: row.get(4)?,
                    auto_disable: row.get::<i64>(5)? != 0,
                    is_active: row.get::<i64>(6)? != 0,
                    created_at: parse_datetime(&row.get::<String>(7)?),
                });
            }
        }

        Ok(out)
    }

    async fn consumed_credits(
        &self,
        target: Target,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, Self::Error> {
        let conn = self.database_client.get_connection()?;
        let since_clause = if since.is_some() { "AND ue.created_at >= ?2" } else { "" };

        let base = match target {
            Target::Agent(_) => format!(
                "SELECT COALESCE(SUM(ue.credits_charged), 0) FROM usage_events ue
                 WHERE ue.agent_id = ?1 AND ue.status = 'SUCCESS' {since_clause}"
            ),
            Target::AgentGroup(_) => {
                format!(
                    "SELECT COALESCE(SUM(ue.credits_charged), 0) FROM usage_events ue
                     JOIN agents a ON ue.agent_id = a.id
                     WHERE a.agent_group_id = ?1 AND ue.status = 'SUCCESS' {since_clause}"
                )
            }
            Target::Workspace(_) => {
                format!(
                    "SELECT COALESCE(SUM(ue.credits_charged), 0) FROM usage_events ue
                     JOIN agents a ON ue.agent_id = a.id
                     JOIN agent_groups ag ON a.agent_group_id = ag.id
                     WHERE ag.workspace_id = ?1 AND ue.status = 'SUCCESS' {since_clause}"
                )
            }
            Target::Org(_) => {
                format!(
                    "SELECT COALESCE(SUM(ue.credits_charged), 0) FROM usage_events ue
                     JOIN agents a ON ue.agent_id = a.id
                     JOIN agent_groups ag ON a.agent_group_id = ag.id
                     JOIN workspaces w ON ag.workspace_id = w.id
                     WHERE w.org_id = ?1 AND ue.status = 'SUCCESS' {since_clause}"
                )
            }
        };

        let target_id = target.id().to_string();
        let mut rows = match since {
            Some(since) => conn.query(&base, params![target_id, since.to_rfc3339()]).await?,
            None => conn.query(&base, params![target_id]).await?,
        };

        let row = rows.next().await?.expect("SUM always returns one row");
        Ok(row.get::<i64>(0)?)
    }

    async fn auto_disable(&self, target: Target) -> Result<(), Self::Error> {
        let conn = self.database_client.get_connection()?;
        let id = target.id().to_string();

        match target {
            Target::Org(_) => {
                conn.execute("UPDATE organizations SET is_active = 0 WHERE id = ?1", params![id]).await?;
            }
            Target::Workspace(_) => {
                conn.execute("UPDATE workspaces SET is_active = 0 WHERE id = ?1", params![id]).await?;
            }
            Target::AgentGroup(_) => {
                conn.execute("UPDATE agent_groups SET is_active = 0 WHERE id = ?1", params![id]).await?;
            }
            Target::Agent(_) => {
                conn.execute(
                    "UPDATE agents SET status = 'budget_exhausted' WHERE id = ?1",
                    params![id],
                )
                .await?;
            }
        }

        Ok(())
    }
}
