// [apps/gateway/src/handlers/gateway.rs]
/*!
 * =================================================================
 * APARATO: CHAT COMPLETION HANDLER (ESTRATO L1-APP)
 * RESPONSABILIDAD: PIPELINE COMPLETO DE FACTURACIÓN DEL GATEWAY
 *
 * Ported line-for-line (in logic, not code) from the original router's
 * request lifecycle: authenticate -> resolve identity -> pre-check
 * (policy, pricing, budget, admission read) -> provider call outside any
 * transaction -> settle the ledger -> respond in an OpenAI-compatible
 * envelope. Every suspending step is `#[instrument]`ed so a slow request
 * is traceable to the exact stage it stalled in.
 * =================================================================
 */

use crate::error::GatewayError;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tollgate_core_budget::check_budgets;
use tollgate_core_cost::{compute_credits, cost_to_credits, cost_usd};
use tollgate_core_ledger::LedgerError;
use tollgate_core_policy::{enforce, merge_policies};
use tollgate_domain_models::{AuditLog, ResolvedIdentity, Target, UsageEvent, UsageStatus};
use tollgate_infra_providers::registry::infer_provider;
use tollgate_infra_providers::{ChatMessage, CompletionRequest};
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatMessagePayload {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequestPayload {
    pub model: String,
    pub messages: Vec<ChatMessagePayload>,
    pub max_tokens: Option<i64>,
    #[allow(dead_code)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub stream: bool,
}

#[instrument(skip(state, identity, payload), fields(agent = %identity.agent_id(), model = %payload.model))]
pub async fn handle_chat_completion(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Json(payload): Json<ChatCompletionRequestPayload>,
) -> Result<Json<Value>, GatewayError> {
    if payload.stream {
        return Err(GatewayError::StreamingUnsupported);
    }

    let request_id = Uuid::new_v4();
    let path = hierarchy_path(&identity);

    // --- Pre-check stage (policy, pricing, budget, admission read) ---
    let policies = state.policy_repository.active_for_path(&path).await?;
    let effective_policy = merge_policies(&policies);
    let effective_max_output = enforce(&effective_policy, &payload.model, payload.max_tokens)?;

    let provider_name = infer_provider(&payload.model);
    let pricing = state
        .pricing_repository
        .get(provider_name, &payload.model)
        .await?
        .ok_or_else(|| GatewayError::PricingNotFound {
            provider: provider_name.to_string(),
            model: payload.model.clone(),
        })?;

    let estimated_output_tokens = effective_max_output.unwrap_or(1024);
    let (_, estimated_credits) = compute_credits(0, estimated_output_tokens, &pricing, identity.organization.credits_per_usd);
    let required_credits = estimated_credits.max(1);

    check_budgets(state.budget_repository.as_ref(), &path, required_credits, Utc::now()).await?;

    // Admission read: in a deployment with cross-process advisory locks this
    // would hold the lock for the duration of the pre-check transaction. Our
    // single-process `Ledger` only locks for the width of `append`/`deduct`
    // (see tollgate-core-ledger), so this read is a pure admission signal,
    // not itself a serialization point.
    let _ = state.ledger.balance(identity.organization.billing_group_id).await?;

    // --- Provider call, outside any transaction ---
    let credential = state
        .credential_repository
        .get_active(identity.org_id(), provider_name)
        .await?;

    let provider = state.provider_registry.acquire(provider_name, credential.as_ref())?;

    let completion_request = CompletionRequest {
        model: payload.model.clone(),
        messages: payload
            .messages
            .iter()
            .map(|m| ChatMessage { role: m.role.clone(), content: m.content.clone() })
            .collect(),
        max_output_tokens: effective_max_output,
    };

    let call_started_at = Instant::now();
    let provider_response = match provider.complete(completion_request).await {
        Ok(response) => response,
        Err(provider_error) => {
            record_provider_error(&state, &identity, &provider_error.to_string(), request_id, provider_name, &payload.model).await?;
            return Err(provider_error.into());
        }
    };
    let latency_ms = call_started_at.elapsed().as_millis() as i64;

    // --- Settle stage ---
    let actual_cost_usd = cost_usd(provider_response.input_tokens, provider_response.output_tokens, &pricing);
    let actual_credits = cost_to_credits(actual_cost_usd, identity.organization.credits_per_usd);

    let idempotency_key = format!("gateway:{request_id}");
    let deduction = state
        .ledger
        .deduct(
            identity.organization.billing_group_id,
            actual_credits,
            Some(idempotency_key),
            Some(json!({ "request_id": request_id, "model": payload.model })),
        )
        .await;

    let total_tokens = provider_response.input_tokens + provider_response.output_tokens;

    match deduction {
        Ok(_) => {
            write_usage_event(
                &state,
                &identity,
                request_id,
                provider_name,
                &payload.model,
                provider_response.input_tokens,
                provider_response.output_tokens,
                actual_cost_usd,
                actual_credits,
                latency_ms,
                UsageStatus::Success,
                None,
            )
            .await?;
            write_audit_log(&state, &identity, request_id, "gateway.request").await?;
        }
        Err(LedgerError::InsufficientCredits { .. }) => {
            write_usage_event(
                &state,
                &identity,
                request_id,
                provider_name,
                &payload.model,
                provider_response.input_tokens,
                provider_response.output_tokens,
                actual_cost_usd,
                0,
                latency_ms,
                UsageStatus::BudgetExceeded,
                None,
            )
            .await?;
            return Err(GatewayError::InsufficientCredits(
                "insufficient credits at settlement time; the provider call already completed".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        "✅ [GATEWAY_REQUEST]: request {} charged {} credits ({}ms)",
        request_id, actual_credits, latency_ms
    );

    Ok(Json(json!({
        "id": format!("chatcmpl-{request_id}"),
        "object": "chat.completion",
        "model": payload.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": provider_response.content },
            "finish_reason": "stop",
        }],
        "usage": {
            "prompt_tokens": provider_response.input_tokens,
            "completion_tokens": provider_response.output_tokens,
            "total_tokens": total_tokens,
        },
        "x_platform": {
            "credits_charged": actual_credits,
            "latency_ms": latency_ms,
            "request_id": request_id,
        },
    })))
}

fn hierarchy_path(identity: &ResolvedIdentity) -> Vec<Target> {
    vec![
        Target::Org(identity.org_id()),
        Target::Workspace(identity.workspace_id()),
        Target::AgentGroup(identity.agent_group_id()),
        Target::Agent(identity.agent_id()),
    ]
}

#[instrument(skip(state, identity))]
async fn record_provider_error(
    state: &AppState,
    identity: &ResolvedIdentity,
    error_message: &str,
    request_id: Uuid,
    provider_name: &str,
    model: &str,
) -> Result<(), GatewayError> {
    warn!("🛑 [PROVIDER_FAULT]: request {} failed: {}", request_id, error_message);

    write_usage_event(
        state,
        identity,
        request_id,
        provider_name,
        model,
        0,
        0,
        rust_decimal::Decimal::ZERO,
        0,
        0,
        UsageStatus::Error,
        Some(error_message.chars().take(1024).collect()),
    )
    .await?;

    write_audit_log(state, identity, request_id, "gateway.request_error").await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn write_usage_event(
    state: &AppState,
    identity: &ResolvedIdentity,
    request_id: Uuid,
    provider_name: &str,
    model: &str,
    input_tokens: i64,
    output_tokens: i64,
    cost_usd_value: rust_decimal::Decimal,
    credits_charged: i64,
    latency_ms: i64,
    status: UsageStatus,
    error_message: Option<String>,
) -> Result<(), GatewayError> {
    let event = UsageEvent {
        id: request_id,
        user_id: identity.organization.owner_user_id,
        group_id: identity.organization.billing_group_id,
        agent_id: Some(identity.agent_id()),
        provider: provider_name.to_string(),
        model: model.to_string(),
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
        cost_usd: cost_usd_value,
        credits_charged,
        latency_ms,
        status,
        error_message,
        created_at: Utc::now(),
    };
    state.usage_repository.record(&event).await?;
    Ok(())
}

async fn write_audit_log(
    state: &AppState,
    identity: &ResolvedIdentity,
    request_id: Uuid,
    event_type: &str,
) -> Result<(), GatewayError> {
    let entry = AuditLog {
        id: Uuid::new_v4(),
        org_id: identity.org_id(),
        actor_user_id: None,
        actor_agent_id: Some(identity.agent_id()),
        event_type: event_type.to_string(),
        resource_type: "gateway_request".to_string(),
        resource_id: request_id.to_string(),
        description: None,
        metadata: None,
        created_at: Utc::now(),
    };
    state.audit_repository.record(&entry).await?;
    Ok(())
}
