// [libs/infra/db/src/repositories/ledger.rs]
/*!
 * =================================================================
 * APARATO: LEDGER REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL LIBRO DE CRÉDITOS
 *
 * Implements `tollgate_core_ledger::LedgerStore` over libSQL. The
 * overdraw/idempotency/lock logic lives in the core crate; this file
 * only turns that contract into SQL.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use serde_json::Value;
use tollgate_core_ledger::{LedgerStore, NewLedgerEntry};
use tollgate_domain_models::{LedgerEntry, TransactionType};
use tracing::instrument;
use uuid::Uuid;

pub struct LedgerRepository {
    database_client: TursoClient,
}

impl LedgerRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::MappingError(format!("bad uuid '{raw}': {e}")))
}

fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn kind_to_sql(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::CreditPurchase => "CREDIT_PURCHASE",
        TransactionType::UsageDeduction => "USAGE_DEDUCTION",
        TransactionType::Adjustment => "ADJUSTMENT",
        TransactionType::Refund => "REFUND",
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    type Error = DbError;

    #[instrument(skip(self))]
    async fn find_by_idempotency_key(
        &self,
        group_id: Uuid,
        key: &str,
    ) -> Result<Option<LedgerEntry>, Self::Error> {
        let conn = self.database_client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, group_id, type, idempotency_key, metadata, created_at, amount
                 FROM ledger_entries WHERE group_id = ?1 AND idempotency_key = ?2",
                params![group_id.to_string(), key],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(self.map_ledger_row(row)?)),
            None => Ok(None),
        }
    }

    async fn balance(&self, group_id: Uuid) -> Result<i64, Self::Error> {
        let conn = self.database_client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT COALESCE(SUM(amount), 0) FROM ledger_entries WHERE group_id = ?1",
                params![group_id.to_string()],
            )
            .await?;
        let row = rows.next().await?.expect("SUM always returns one row");
        Ok(row.get::<i64>(0)?)
    }

    #[instrument(skip(self, entry), fields(group_id = %entry.group_id, amount = entry.amount))]
    async fn insert(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, Self::Error> {
        let conn = self.database_client.get_connection()?;
        let id = Uuid::new_v4();
        let metadata_json = entry
            .metadata
            .as_ref()
            .map(|m| m.to_string());

        conn.execute(
            "INSERT INTO ledger_entries (id, group_id, amount, type, idempotency_key, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                entry.group_id.to_string(),
                entry.amount,
                kind_to_sql(entry.kind),
                entry.idempotency_key.clone(),
                metadata_json
            ],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT id, group_id, type, idempotency_key, metadata, created_at, amount
                 FROM ledger_entries WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.expect("row just inserted must be readable");
        self.map_ledger_row(row)
    }
}

impl LedgerRepository {
    fn map_ledger_row(&self, row: Row) -> Result<LedgerEntry, DbError> {
        let kind_raw: String = row.get(2)?;
        let kind = match kind_raw.as_str() {
            "CREDIT_PURCHASE" => TransactionType::CreditPurchase,
            "ADJUSTMENT" => TransactionType::Adjustment,
            "REFUND" => TransactionType::Refund,
            _ => TransactionType::UsageDeduction,
        };
        let metadata_raw: Option<String> = row.get(4)?;
        Ok(LedgerEntry {
            id: parse_uuid(&row.get::<String>(0)?)?,
            group_id: parse_uuid(&row.get::<String>(1)?)?,
            amount: row.get::<i64>(6)?,
            kind,
            idempotency_key: row.get(3)?,
            metadata: metadata_raw
                .map(|m| serde_json::from_str::<Value>(&m))
                .transpose()
                .map_err(|e| DbError::MappingError(format!("bad metadata json: {e}")))?,
            created_at: parse_datetime(&row.get::<String>(5)?),
        })
    }
}
