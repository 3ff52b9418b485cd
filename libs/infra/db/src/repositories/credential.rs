// [libs/infra/db/src/repositories/credential.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: BÓVEDA DE CLAVES BYOK CIFRADAS
 *
 * Stores only the ciphertext; `tollgate-infra-providers` holds the
 * Fernet-equivalent decrypt step and is the only consumer that ever
 * sees plaintext. When an org has more than one active credential for a
 * provider, the most recently created one wins (see DESIGN.md).
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{parse_datetime, parse_uuid};
use crate::TursoClient;
use libsql::params;
use tollgate_domain_models::{CredentialMode, ProviderCredential};
use uuid::Uuid;

pub struct CredentialRepository {
    database_client: TursoClient,
}

impl CredentialRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn get_active(
        &self,
        org_id: Uuid,
        provider: &str,
    ) -> Result<Option<ProviderCredential>, DbError> {
        let conn = self.database_client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, org_id, provider, mode, encrypted_api_key, label, is_active, created_at
                 FROM provider_credentials
                 WHERE org_id = ?1 AND provider = ?2 AND is_active = 1
                 ORDER BY created_at DESC
                 LIMIT 1",
                params![org_id.to_string(), provider],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let mode_raw: String = row.get(3)?;
        Ok(Some(ProviderCredential {
            id: parse_uuid(&row.get::<String>(0)?)?,
            org_id: parse_uuid(&row.get::<String>(1)?)?,
            provider: row.get(2)?,
            mode: if mode_raw == "BYOK" { CredentialMode::Byok } else { CredentialMode::Managed },
            encrypted_api_key: row.get(4)?,
            label: row.get(5)?,
            is_active: row.get::<i64>(6)? != 0,
            created_at: parse_datetime(&row.get::<String>(7)?),
        }))
    }

    pub async fn create(&self, credential: &ProviderCredential) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        conn.execute(
            "INSERT INTO provider_credentials (id, org_id, provider, mode, encrypted_api_key, label, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                credential.id.to_string(),
                credential.org_id.to_string(),
                credential.provider.clone(),
                match credential.mode {
                    CredentialMode::Byok => "BYOK",
                    CredentialMode::Managed => "MANAGED",
                },
                credential.encrypted_api_key.clone(),
                credential.label.clone(),
                credential.is_active
            ],
        )
        .await?;
        Ok(())
    }
}
