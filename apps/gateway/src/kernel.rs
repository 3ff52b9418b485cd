// [apps/gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY KERNEL (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN DEL SERVIDOR
 * =================================================================
 */

use crate::routes::build_router;
use crate::state::AppState;
use std::net::{IpAddr, SocketAddr};
use tollgate_infra_db::TursoClient;
use tollgate_infra_providers::{CredentialCipher, ProviderRegistry};
use tracing::{error, info, instrument};

pub struct GatewayKernel {
    server_port: u16,
    state: AppState,
}

impl GatewayKernel {
    #[instrument(skip(database_access_token, credential_master_key))]
    pub async fn ignite(
        database_connection_url: &str,
        database_access_token: Option<String>,
        credential_master_key: &str,
        openai_api_key: Option<String>,
        anthropic_api_key: Option<String>,
        server_port: u16,
    ) -> Self {
        let database_client = TursoClient::connect(database_connection_url, database_access_token)
            .await
            .expect("FATAL: database link collapse, ignition aborted.");

        let cipher = CredentialCipher::new(credential_master_key)
            .expect("FATAL: TOLLGATE_CREDENTIAL_KEY is not a valid Fernet key.");

        let provider_registry = ProviderRegistry::bootstrap(openai_api_key, anthropic_api_key, cipher);

        Self {
            server_port,
            state: AppState::new(database_client, provider_registry),
        }
    }

    pub async fn launch(self) {
        let router = build_router(self.state);
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.server_port);

        info!("🚀 [GATEWAY_ONLINE]: listening at {}", bind_address);

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .expect("CRITICAL_FAULT: failed to bind network port.");

        if let Err(err) = axum::serve(listener, router).await {
            error!("💀 [GATEWAY_COLLAPSE]: runtime failure: {}", err);
            std::process::exit(1);
        }
    }
}
