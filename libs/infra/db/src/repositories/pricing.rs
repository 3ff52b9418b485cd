// [libs/infra/db/src/repositories/pricing.rs]
/*!
 * =================================================================
 * APARATO: PRICING REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: TARIFAS POR PROVEEDOR Y MODELO
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use libsql::params;
use rust_decimal::Decimal;
use std::str::FromStr;
use tollgate_domain_models::PricingRule;

pub struct PricingRepository {
    database_client: TursoClient,
}

impl PricingRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn get(&self, provider: &str, model: &str) -> Result<Option<PricingRule>, DbError> {
        let conn = self.database_client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT provider, model, input_cost_per_1k, output_cost_per_1k
                 FROM pricing_rules WHERE provider = ?1 AND model = ?2",
                params![provider, model],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let input_raw: String = row.get(2)?;
        let output_raw: String = row.get(3)?;

        Ok(Some(PricingRule {
            provider: row.get(0)?,
            model: row.get(1)?,
            input_cost_per_1k: Decimal::from_str(&input_raw)
                .map_err(|e| DbError::MappingError(format!("bad decimal '{input_raw}': {e}")))?,
            output_cost_per_1k: Decimal::from_str(&output_raw)
                .map_err(|e| DbError::MappingError(format!("bad decimal '{output_raw}': {e}")))?,
        }))
    }

    pub async fn upsert(&self, rule: &PricingRule) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        conn.execute(
            "INSERT INTO pricing_rules (provider, model, input_cost_per_1k, output_cost_per_1k)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(provider, model) DO UPDATE SET
                input_cost_per_1k = excluded.input_cost_per_1k,
                output_cost_per_1k = excluded.output_cost_per_1k",
            params![
                rule.provider.clone(),
                rule.model.clone(),
                rule.input_cost_per_1k.to_string(),
                rule.output_cost_per_1k.to_string()
            ],
        )
        .await?;
        Ok(())
    }
}
