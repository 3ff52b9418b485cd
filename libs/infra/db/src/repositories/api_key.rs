// [libs/infra/db/src/repositories/api_key.rs]
/*!
 * =================================================================
 * APARATO: API KEY REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DE CLAVES DE PLATAFORMA
 *
 * Keys are minted as `cpk_<32 random bytes, base64url>`, hashed with
 * SHA-256 before storage — the plaintext is returned to the caller
 * exactly once, at creation time, and never persisted.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::parse_datetime;
use crate::TursoClient;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use libsql::params;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tollgate_domain_models::ApiKey;
use uuid::Uuid;

pub struct ApiKeyRepository {
    database_client: TursoClient,
}

/// The plaintext key, returned once at mint time, plus the row that was
/// persisted (holding only its hash).
pub struct MintedApiKey {
    pub plaintext: String,
    pub record: ApiKey,
}

pub fn hash_key(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_plaintext() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("cpk_{}", URL_SAFE_NO_PAD.encode(bytes))
}

impl ApiKeyRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    pub async fn mint(&self, agent_id: Uuid, name: &str) -> Result<MintedApiKey, DbError> {
        let plaintext = generate_plaintext();
        let key_hash = hash_key(&plaintext);
        let key_suffix = plaintext.chars().rev().take(8).collect::<String>().chars().rev().collect::<String>();
        let id = Uuid::new_v4();

        let conn = self.database_client.get_connection()?;
        conn.execute(
            "INSERT INTO api_keys (id, agent_id, name, key_hash, key_suffix, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![id.to_string(), agent_id.to_string(), name, key_hash.clone(), key_suffix.clone()],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT id, agent_id, name, key_hash, key_suffix, is_active, revoked_reason, created_at
                 FROM api_keys WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.expect("row just inserted must be readable");

        Ok(MintedApiKey {
            plaintext,
            record: ApiKey {
                id,
                agent_id: Uuid::parse_str(&row.get::<String>(1)?)
                    .map_err(|e| DbError::MappingError(e.to_string()))?,
                name: row.get(2)?,
                key_hash: row.get(3)?,
                key_suffix: row.get(4)?,
                is_active: row.get::<i64>(5)? != 0,
                revoked_reason: row.get(6)?,
                created_at: parse_datetime(&row.get::<String>(7)?),
            },
        })
    }

    pub async fn revoke(&self, api_key_id: Uuid, reason: &str) -> Result<(), DbError> {
        let conn = self.database_client.get_connection()?;
        let changed = conn
            .execute(
                "UPDATE api_keys SET is_active = 0, revoked_reason = ?2 WHERE id = ?1",
                params![api_key_id.to_string(), reason],
            )
            .await?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("api_key {api_key_id}")));
        }
        Ok(())
    }
}
