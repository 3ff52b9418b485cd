// [apps/gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DEL PROCESO
 * =================================================================
 */

use dotenvy::dotenv;
use tollgate_gateway::GatewayKernel;
use tollgate_shared_telemetry::init_tracing;
use tracing::info;

fn main() {
    dotenv().ok();
    init_tracing("tollgate_gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    runtime.block_on(async {
        let database_connection_url =
            std::env::var("DATABASE_URL").expect("CRITICAL_FAULT: DATABASE_URL not defined.");
        let database_access_token = std::env::var("TURSO_AUTH_TOKEN").ok();
        let credential_master_key =
            std::env::var("TOLLGATE_CREDENTIAL_KEY").expect("CRITICAL_FAULT: TOLLGATE_CREDENTIAL_KEY not defined.");
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let server_port: u16 = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().unwrap_or(3000);

        info!("🛰️ [GATEWAY_BOOT]: starting ignition sequence...");

        let kernel = GatewayKernel::ignite(
            &database_connection_url,
            database_access_token,
            &credential_master_key,
            openai_api_key,
            anthropic_api_key,
            server_port,
        )
        .await;

        kernel.launch().await;
    });
}
