// [apps/gateway/src/error.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ERROR TAXONOMY (ESTRATO L1-APP)
 * RESPONSABILIDAD: MAPEO DE FALLOS DE DOMINIO A RESPUESTAS HTTP
 *
 * One tagged enum, one `IntoResponse` impl. Every engine crate's error
 * type funnels into this through a `From` impl instead of each handler
 * hand-rolling a status code.
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tollgate_core_budget::CheckBudgetsError;
use tollgate_core_cost::CostError;
use tollgate_core_ledger::LedgerError;
use tollgate_core_policy::PolicyError;
use tollgate_infra_db::DbError;
use tollgate_infra_providers::ProviderError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing or malformed Authorization header")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    PolicyViolation(String),
    #[error("no pricing rule for {provider}/{model}")]
    PricingNotFound { provider: String, model: String },
    #[error("{0}")]
    BudgetExceeded(String),
    #[error("{0}")]
    InsufficientCredits(String),
    #[error("streaming responses are not supported")]
    StreamingUnsupported,
    #[error("upstream provider rejected the request: {0}")]
    ProviderRejected(String),
    #[error("BYOK credential missing for provider '{0}'")]
    CredentialMissing(String),
    #[error("internal fault: {0}")]
    Internal(String),
}

impl From<DbError> for GatewayError {
    fn from(err: DbError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl From<PolicyError> for GatewayError {
    fn from(err: PolicyError) -> Self {
        GatewayError::PolicyViolation(err.to_string())
    }
}

impl From<CostError> for GatewayError {
    fn from(err: CostError) -> Self {
        match err {
            CostError::PricingNotFound { provider, model } => {
                GatewayError::PricingNotFound { provider, model }
            }
        }
    }
}

impl From<CheckBudgetsError<DbError>> for GatewayError {
    fn from(err: CheckBudgetsError<DbError>) -> Self {
        match err {
            CheckBudgetsError::Budget(e) => GatewayError::BudgetExceeded(e.to_string()),
            CheckBudgetsError::Source(e) => GatewayError::Internal(e.to_string()),
        }
    }
}

impl From<LedgerError<DbError>> for GatewayError {
    fn from(err: LedgerError<DbError>) -> Self {
        match err {
            LedgerError::InsufficientCredits { balance, required } => GatewayError::InsufficientCredits(
                format!("balance {balance} is insufficient for {required} credits"),
            ),
            LedgerError::Store(e) => GatewayError::Internal(e.to_string()),
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            // `infer_provider` only ever names a provider this codebase knows
            // how to drive, so this variant can only mean "no managed
            // singleton and no BYOK credential for this org" at acquisition
            // time — the 503 case spec.md's external interface table names.
            ProviderError::UnknownProvider(name) => GatewayError::CredentialMissing(name),
            other => GatewayError::ProviderRejected(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            GatewayError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            GatewayError::PolicyViolation(_) => (StatusCode::FORBIDDEN, "POLICY_VIOLATION"),
            GatewayError::PricingNotFound { .. } => (StatusCode::NOT_FOUND, "PRICING_NOT_FOUND"),
            GatewayError::BudgetExceeded(_) => (StatusCode::PAYMENT_REQUIRED, "BUDGET_EXCEEDED"),
            GatewayError::InsufficientCredits(_) => (StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_CREDITS"),
            GatewayError::StreamingUnsupported => (StatusCode::BAD_REQUEST, "STREAMING_UNSUPPORTED"),
            GatewayError::ProviderRejected(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            GatewayError::CredentialMissing(_) => (StatusCode::SERVICE_UNAVAILABLE, "CREDENTIAL_MISSING"),
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_FAULT"),
        };

        (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response()
    }
}
