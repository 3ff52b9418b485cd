// [apps/gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: ROUTING MATRIX (ESTRATO L1-APP)
 * RESPONSABILIDAD: TOPOLOGÍA HTTP DEL GATEWAY
 * =================================================================
 */

use crate::handlers::gateway::handle_chat_completion;
use crate::middleware::auth_guard;
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let authenticated = Router::new()
        .route("/v1/chat/completions", post(handle_chat_completion))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/gateway", authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
