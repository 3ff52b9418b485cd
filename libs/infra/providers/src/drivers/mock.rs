// [libs/infra/providers/src/drivers/mock.rs]
/*!
 * =================================================================
 * APARATO: MOCK DRIVER (ESTRATO L3)
 * RESPONSABILIDAD: RESPUESTA DETERMINISTA PARA DESARROLLO Y PRUEBAS
 *
 * No network call. Token counts are a deterministic function of the
 * input so cost-engine and budget tests never depend on a live vendor.
 * A request for model `mock-error` always rejects, deterministically —
 * the one fault injection point downstream tests use to exercise the
 * no-charge-on-provider-error path without a real vendor outage.
 * =================================================================
 */

use crate::errors::ProviderError;
use crate::provider::Provider;
use crate::types::{CompletionRequest, ProviderResponse};
use async_trait::async_trait;
use serde_json::json;

#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError> {
        if request.model == "mock-error" {
            return Err(ProviderError::UpstreamRejection {
                status: 500,
                body: "synthetic upstream fault".to_string(),
            });
        }

        let total_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        let input_tokens = (total_chars as i64 / 4).max(10);
        let output_tokens = input_tokens * 2;

        Ok(ProviderResponse {
            content: "This is a deterministic mock completion.".to_string(),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            raw_metadata: json!({ "mock": true, "model": request.model }),
        })
    }
}
