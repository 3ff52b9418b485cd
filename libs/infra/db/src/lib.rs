// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: INFRA DB (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA LIBSQL PARA EL GATEWAY
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use errors::DbError;

use tollgate_domain_models::Target;
use uuid::Uuid;

/// `Target`'s tagged-enum shape collapses to two TEXT columns in storage.
pub(crate) fn target_to_columns(target: Target) -> (&'static str, String) {
    match target {
        Target::Org(id) => ("org", id.to_string()),
        Target::Workspace(id) => ("workspace", id.to_string()),
        Target::AgentGroup(id) => ("agent_group", id.to_string()),
        Target::Agent(id) => ("agent", id.to_string()),
    }
}

pub(crate) fn columns_to_target(target_type: &str, target_id: &str) -> Result<Target, DbError> {
    let id = Uuid::parse_str(target_id)
        .map_err(|e| DbError::MappingError(format!("bad target_id '{target_id}': {e}")))?;
    match target_type {
        "org" => Ok(Target::Org(id)),
        "workspace" => Ok(Target::Workspace(id)),
        "agent_group" => Ok(Target::AgentGroup(id)),
        "agent" => Ok(Target::Agent(id)),
        other => Err(DbError::MappingError(format!("unknown target_type '{other}'"))),
    }
}
