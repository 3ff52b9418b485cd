// [apps/gateway/tests/gateway_pipeline.rs]
//! End-to-end pipeline tests: real router, real in-memory libSQL schema,
//! `MockProvider` standing in for a vendor. Exercises the HTTP-facing
//! error taxonomy and the ledger's no-charge-on-provider-error guarantee
//! without a live network call.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use fernet::Fernet;
use serde_json::{json, Value};
use tollgate_core_ledger::{Ledger, NewLedgerEntry};
use tollgate_domain_models::TransactionType;
use tollgate_gateway::routes::build_router;
use tollgate_gateway::AppState;
use tollgate_infra_db::repositories::{ApiKeyRepository, LedgerRepository};
use tollgate_infra_db::TursoClient;
use tollgate_infra_providers::{CredentialCipher, ProviderRegistry};
use tower::ServiceExt;
use uuid::Uuid;

/// One seeded org/workspace/agent_group/agent with a minted API key, a
/// funded billing group, and pricing rules for every model a test needs.
struct Fixture {
    state: AppState,
    api_key: String,
    billing_group_id: Uuid,
}

async fn seed(opening_balance: i64) -> Fixture {
    let client = TursoClient::connect(":memory:", None).await.expect("in-memory connect");
    let conn = client.get_connection().expect("connection checkout");

    let org_id = Uuid::new_v4();
    let billing_group_id = Uuid::new_v4();
    let owner_user_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let agent_group_id = Uuid::new_v4();
    let agent_id = Uuid::new_v4();

    conn.execute(
        "INSERT INTO organizations (id, name, billing_group_id, owner_user_id, credits_per_usd, is_active)
         VALUES (?1, 'test-org', ?2, ?3, 100, 1)",
        libsql::params![org_id.to_string(), billing_group_id.to_string(), owner_user_id.to_string()],
    )
    .await
    .expect("seed organization");

    conn.execute(
        "INSERT INTO workspaces (id, org_id, name, is_active) VALUES (?1, ?2, 'test-workspace', 1)",
        libsql::params![workspace_id.to_string(), org_id.to_string()],
    )
    .await
    .expect("seed workspace");

    conn.execute(
        "INSERT INTO agent_groups (id, workspace_id, name, is_active) VALUES (?1, ?2, 'test-group', 1)",
        libsql::params![agent_group_id.to_string(), workspace_id.to_string()],
    )
    .await
    .expect("seed agent_group");

    conn.execute(
        "INSERT INTO agents (id, agent_group_id, name, status) VALUES (?1, ?2, 'test-agent', 'active')",
        libsql::params![agent_id.to_string(), agent_group_id.to_string()],
    )
    .await
    .expect("seed agent");

    for model in ["mock-model", "mock-error"] {
        conn.execute(
            "INSERT INTO pricing_rules (provider, model, input_cost_per_1k, output_cost_per_1k)
             VALUES ('mock', ?1, '0.001', '0.002')",
            libsql::params![model],
        )
        .await
        .expect("seed pricing rule");
    }

    let minted = ApiKeyRepository::new(client.clone())
        .mint(agent_id, "test-key")
        .await
        .expect("mint api key");

    if opening_balance != 0 {
        let funding_ledger = Ledger::new(LedgerRepository::new(client.clone()));
        funding_ledger
            .append(NewLedgerEntry {
                group_id: billing_group_id,
                amount: opening_balance,
                kind: TransactionType::CreditPurchase,
                idempotency_key: None,
                metadata: None,
            })
            .await
            .expect("fund billing group");
    }

    let cipher = CredentialCipher::new(&Fernet::generate_key()).expect("cipher");
    let provider_registry = ProviderRegistry::bootstrap(None, None, cipher);
    let state = AppState::new(client, provider_registry);

    Fixture { state, api_key: minted.plaintext, billing_group_id }
}

fn chat_request(api_key: &str, model: &str) -> Request<Body> {
    let payload = json!({
        "model": model,
        "messages": [{"role": "user", "content": "hello there"}],
    });

    Request::builder()
        .method("POST")
        .uri("/gateway/v1/chat/completions")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {api_key}"))
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn successful_completion_charges_ledger_and_returns_platform_envelope() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state.clone());

    let balance_before = fixture.state.ledger.balance(fixture.billing_group_id).await.unwrap();

    let response = router.oneshot(chat_request(&fixture.api_key, "mock-model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let credits_charged = body["x_platform"]["credits_charged"].as_i64().unwrap();
    assert!(credits_charged > 0);

    let balance_after = fixture.state.ledger.balance(fixture.billing_group_id).await.unwrap();
    assert_eq!(balance_after, balance_before - credits_charged);
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state);

    let request = Request::builder()
        .method("POST")
        .uri("/gateway/v1/chat/completions")
        .header("content-type", "application/json")
        .body(Body::from(json!({"model": "mock-model", "messages": []}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bearer_prefix_is_rejected() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state);

    let request = Request::builder()
        .method("POST")
        .uri("/gateway/v1/chat/completions")
        .header("content-type", "application/json")
        .header("authorization", "Bearer not-a-platform-key")
        .body(Body::from(json!({"model": "mock-model", "messages": []}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_model_pricing_returns_404() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state.clone());

    let response = router.oneshot(chat_request(&fixture.api_key, "totally-unpriced-model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// G-NO-CHARGE-ON-PROVIDER-ERROR: a provider failure after pre-check must
/// never leave a ledger deduction behind.
#[tokio::test]
async fn provider_failure_does_not_charge_the_ledger() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state.clone());

    let balance_before = fixture.state.ledger.balance(fixture.billing_group_id).await.unwrap();

    let response = router.oneshot(chat_request(&fixture.api_key, "mock-error")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let balance_after = fixture.state.ledger.balance(fixture.billing_group_id).await.unwrap();
    assert_eq!(balance_before, balance_after, "a failed provider call must not deduct credits");
}

#[tokio::test]
async fn insufficient_credits_at_settlement_returns_402() {
    let fixture = seed(0).await;
    let router = build_router(fixture.state.clone());

    let response = router.oneshot(chat_request(&fixture.api_key, "mock-model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let balance_after = fixture.state.ledger.balance(fixture.billing_group_id).await.unwrap();
    assert_eq!(balance_after, 0, "a rejected settlement must not move the balance");
}

#[tokio::test]
async fn health_check_is_reachable_without_authentication() {
    let fixture = seed(100_000).await;
    let router = build_router(fixture.state);

    let request = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
