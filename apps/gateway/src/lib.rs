// [apps/gateway/src/lib.rs]
/*!
 * =================================================================
 * CRATE: tollgate-gateway (ESTRATO L1-APP)
 * RESPONSABILIDAD: PUNTO DE ENTRADA HTTP DEL GATEWAY MULTI-TENANT
 * =================================================================
 */

pub mod error;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod state;

pub use kernel::GatewayKernel;
pub use state::AppState;
