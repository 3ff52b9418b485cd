// [libs/infra/db/src/schema.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY DATABASE SCHEMA (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * Every table below exists to back exactly one domain model in
 * `tollgate-domain-models`. `Target`'s four tagged variants collapse to
 * `(target_type, target_id)` pairs here — storage keeps the CHECK-style
 * discipline of "one scope, named once" even though the Rust side never
 * juggles four nullable columns.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const BASE_TABLES: &[(&str, &str)] = &[
    ("TABLE_ORGANIZATIONS", r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            billing_group_id TEXT NOT NULL,
            owner_user_id TEXT NOT NULL,
            credits_per_usd INTEGER NOT NULL DEFAULT 100,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_WORKSPACES", r#"
        CREATE TABLE IF NOT EXISTS workspaces (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id),
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_AGENT_GROUPS", r#"
        CREATE TABLE IF NOT EXISTS agent_groups (
            id TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL REFERENCES workspaces(id),
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_AGENTS", r#"
        CREATE TABLE IF NOT EXISTS agents (
            id TEXT PRIMARY KEY,
            agent_group_id TEXT NOT NULL REFERENCES agent_groups(id),
            name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_API_KEYS", r#"
        CREATE TABLE IF NOT EXISTS api_keys (
            id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL REFERENCES agents(id),
            name TEXT NOT NULL,
            key_hash TEXT NOT NULL UNIQUE,
            key_suffix TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            revoked_reason TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PROVIDER_CREDENTIALS", r#"
        CREATE TABLE IF NOT EXISTS provider_credentials (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id),
            provider TEXT NOT NULL,
            mode TEXT NOT NULL,
            encrypted_api_key TEXT NOT NULL,
            label TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_LEDGER_ENTRIES", r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id TEXT PRIMARY KEY,
            group_id TEXT NOT NULL,
            amount INTEGER NOT NULL,
            type TEXT NOT NULL,
            idempotency_key TEXT,
            metadata TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_POLICIES", r#"
        CREATE TABLE IF NOT EXISTS policies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            target_type TEXT NOT NULL,
            target_id TEXT NOT NULL,
            allowed_models TEXT,
            max_input_tokens INTEGER,
            max_output_tokens INTEGER,
            rpm_limit INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_BUDGETS", r#"
        CREATE TABLE IF NOT EXISTS budgets (
            id TEXT PRIMARY KEY,
            target_type TEXT NOT NULL,
            target_id TEXT NOT NULL,
            period TEXT NOT NULL,
            limit_credits INTEGER NOT NULL,
            auto_disable INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PRICING_RULES", r#"
        CREATE TABLE IF NOT EXISTS pricing_rules (
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            input_cost_per_1k TEXT NOT NULL,
            output_cost_per_1k TEXT NOT NULL,
            PRIMARY KEY (provider, model)
        );
    "#),
    ("TABLE_USAGE_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS usage_events (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            group_id TEXT NOT NULL,
            agent_id TEXT,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            input_tokens INTEGER NOT NULL,
            output_tokens INTEGER NOT NULL,
            total_tokens INTEGER NOT NULL,
            cost_usd TEXT NOT NULL,
            credits_charged INTEGER NOT NULL,
            latency_ms INTEGER NOT NULL,
            status TEXT NOT NULL,
            error_message TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_AUDIT_LOGS", r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            actor_user_id TEXT,
            actor_agent_id TEXT,
            event_type TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            resource_id TEXT NOT NULL,
            description TEXT,
            metadata TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_WORKSPACES_ORG", "CREATE INDEX IF NOT EXISTS idx_workspaces_org ON workspaces(org_id);"),
    ("IDX_AGENT_GROUPS_WORKSPACE", "CREATE INDEX IF NOT EXISTS idx_agent_groups_workspace ON agent_groups(workspace_id);"),
    ("IDX_AGENTS_GROUP", "CREATE INDEX IF NOT EXISTS idx_agents_group ON agents(agent_group_id);"),
    ("IDX_API_KEYS_AGENT", "CREATE INDEX IF NOT EXISTS idx_api_keys_agent ON api_keys(agent_id);"),
    ("IDX_CREDENTIALS_ORG_PROVIDER", "CREATE INDEX IF NOT EXISTS idx_credentials_org_provider ON provider_credentials(org_id, provider, is_active);"),
    ("IDX_LEDGER_GROUP", "CREATE INDEX IF NOT EXISTS idx_ledger_group ON ledger_entries(group_id);"),
    ("IDX_LEDGER_IDEMPOTENCY", "CREATE UNIQUE INDEX IF NOT EXISTS idx_ledger_idempotency ON ledger_entries(group_id, idempotency_key) WHERE idempotency_key IS NOT NULL;"),
    ("IDX_POLICIES_TARGET", "CREATE INDEX IF NOT EXISTS idx_policies_target ON policies(target_type, target_id, is_active);"),
    ("IDX_BUDGETS_TARGET", "CREATE INDEX IF NOT EXISTS idx_budgets_target ON budgets(target_type, target_id, is_active);"),
    ("IDX_USAGE_GROUP_CREATED", "CREATE INDEX IF NOT EXISTS idx_usage_group_created ON usage_events(group_id, created_at);"),
    ("IDX_USAGE_AGENT_CREATED", "CREATE INDEX IF NOT EXISTS idx_usage_agent_created ON usage_events(agent_id, created_at);"),
    ("IDX_AUDIT_ORG_CREATED", "CREATE INDEX IF NOT EXISTS idx_audit_org_created ON audit_logs(org_id, created_at);"),
];

#[instrument(skip(database_connection))]
pub async fn apply_gateway_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: synchronizing gateway schema...");
    for (identifier, sql) in BASE_TABLES {
        debug!("  ↳ solidifying: {}", identifier);
        database_connection
            .execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ hardening: {}", identifier);
        database_connection
            .execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    info!("✅ [SCHEMA_ENGINE]: gateway schema level and certified.");
    Ok(())
}
