// [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: DATABASE CONNECTION CLIENT (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES Y PERSISTENCIA ACID
 *
 * # In-memory consistency
 * A `:memory:` libSQL handle is only visible across connections opened
 * from the same `Database` instance while at least one connection stays
 * open. `_memory_persistence_anchor` holds that one extra connection for
 * the lifetime of the client so the schema and every row written through
 * it stay visible to every other connection this process opens.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_gateway_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct TursoClient {
    internal_database_driver: Arc<Database>,
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl TursoClient {
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, DbError> {
        if database_connection_url.is_empty() {
            return Err(DbError::ConnectionError("DATABASE_URL_UNDEFINED".into()));
        }

        info!("🔌 [DATABASE]: opening link to [{}]", database_connection_url);

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");
        let is_memory =
            database_connection_url.contains(":memory:") || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                DbError::ConnectionError("remote access requires a token".into())
            })?;
            Builder::new_remote(database_connection_url.to_string(), token)
                .build()
                .await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|e| DbError::ConnectionError(format!("driver ignition failure: {e}")))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = shared_driver
                .connect()
                .map_err(|e| DbError::ConnectionError(format!("anchor fault: {e}")))?;
            apply_gateway_schema(&anchor_conn)
                .await
                .map_err(|e| DbError::ConnectionError(format!("schema sync fault: {e}")))?;
            anchor = Some(Arc::new(anchor_conn));
            info!("⚓ [DATABASE]: in-memory schema anchored.");
        } else {
            let bootstrap_conn = shared_driver
                .connect()
                .map_err(|e| DbError::ConnectionError(format!("bootstrap link fault: {e}")))?;
            apply_gateway_schema(&bootstrap_conn)
                .await
                .map_err(|e| DbError::ConnectionError(format!("schema sync fault: {e}")))?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, DbError> {
        self.internal_database_driver.connect().map_err(|e| {
            error!("⚠️ [POOL_FAULT]: connection checkout failed: {}", e);
            DbError::ConnectionError(e.to_string())
        })
    }
}
