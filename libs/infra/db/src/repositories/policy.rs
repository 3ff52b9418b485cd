// [libs/infra/db/src/repositories/policy.rs]
/*!
 * =================================================================
 * APARATO: POLICY REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: CARGA DE POLÍTICAS ACTIVAS POR RUTA JERÁRQUICA
 * =================================================================
 */

use crate::errors::DbError;
use crate::{columns_to_target, target_to_columns, TursoClient};
use libsql::{params, Row};
use tollgate_domain_models::{Policy, Target};
use uuid::Uuid;

pub struct PolicyRepository {
    database_client: TursoClient,
}

impl PolicyRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /// Every active policy attached to any target on `path`, one query per
    /// call site (the caller decides how many levels to check).
    pub async fn active_for_path(&self, path: &[Target]) -> Result<Vec<Policy>, DbError> {
        let conn = self.database_client.get_connection()?;
        let mut out = Vec::with_capacity(path.len());

        for target in path {
            let (target_type, target_id) = target_to_columns(*target);
            let mut rows = conn
                .query(
                    "SELECT id, name, target_type, target_id, allowed_models,
                            max_input_tokens, max_output_tokens, rpm_limit, is_active, created_at
                     FROM policies WHERE target_type = ?1 AND target_id = ?2 AND is_active = 1",
                    params![target_type, target_id],
                )
                .await?;

            while let Some(row) = rows.next().await? {
                out.push(map_row(row)?);
            }
        }

        Ok(out)
    }
}

fn map_row(row: Row) -> Result<Policy, DbError> {
    let target = columns_to_target(&row.get::<String>(2)?, &row.get::<String>(3)?)?;
    let allowed_raw: Option<String> = row.get(4)?;
    let allowed_models = allowed_raw
        .map(|s| serde_json::from_str::<Vec<String>>(&s))
        .transpose()
        .map_err(|e| DbError::MappingError(format!("bad allowed_models json: {e}")))?;

    Ok(Policy {
        id: Uuid::parse_str(&row.get::<String>(0)?)
            .map_err(|e| DbError::MappingError(e.to_string()))?,
        name: row.get(1)?,
        target,
        allowed_models,
        max_input_tokens: row.get(5)?,
        max_output_tokens: row.get(6)?,
        rpm_limit: row.get(7)?,
        is_active: row.get::<i64>(8)? != 0,
        created_at: crate::repositories::parse_datetime(&row.get::<String>(9)?),
    })
}
