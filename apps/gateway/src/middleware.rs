// [apps/gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: BEARER TOKEN AUTH GUARD (ESTRATO L1-APP)
 * RESPONSABILIDAD: AUTENTICACIÓN Y RESOLUCIÓN DE IDENTIDAD
 *
 * spec.md §4.6 steps 1-2 in one middleware pass: parse `Bearer cpk_…`,
 * hash it, resolve the four-hop hierarchy path, and reject inactive
 * links before the handler ever sees the request. The resolved path is
 * injected as a request extension so the handler never re-queries it.
 * =================================================================
 */

use crate::error::GatewayError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tollgate_infra_db::repositories::api_key::hash_key;
use tracing::{debug, warn};

const TOKEN_PREFIX: &str = "cpk_";

pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token.starts_with(TOKEN_PREFIX) => token,
        _ => {
            warn!("🚫 [AUTH_REJECT]: missing or malformed bearer token");
            return GatewayError::Unauthenticated.into_response();
        }
    };

    let key_hash = hash_key(token);
    let identity = match state.hierarchy_repository.resolve_by_key_hash(&key_hash).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            warn!("🚫 [AUTH_REJECT]: unknown or revoked api key");
            return GatewayError::Unauthenticated.into_response();
        }
        Err(e) => return GatewayError::from(e).into_response(),
    };

    if !identity.agent.is_active() {
        return GatewayError::Forbidden(format!("agent '{}' is not active", identity.agent.id)).into_response();
    }
    if !identity.agent_group.is_active {
        return GatewayError::Forbidden(format!("agent_group '{}' is not active", identity.agent_group.id))
            .into_response();
    }
    if !identity.workspace.is_active {
        return GatewayError::Forbidden(format!("workspace '{}' is not active", identity.workspace.id))
            .into_response();
    }
    if !identity.organization.is_active {
        return GatewayError::Forbidden(format!("organization '{}' is not active", identity.organization.id))
            .into_response();
    }

    debug!("🔑 [AUTH]: resolved agent '{}' under org '{}'", identity.agent.id, identity.organization.id);
    req.extensions_mut().insert(identity);
    next.run(req).await
}
