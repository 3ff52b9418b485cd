// [libs/infra/providers/src/drivers/anthropic.rs]
/*!
 * =================================================================
 * APARATO: ANTHROPIC-SHAPED DRIVER (ESTRATO L3)
 * RESPONSABILIDAD: WIRE FORMAT PARA /v1/messages
 *
 * Anthropic's wire format pulls the system prompt out of the message
 * array into its own top-level field, and charges a longer default
 * timeout than OpenAI-shaped drivers — both ported verbatim from the
 * original provider.
 * =================================================================
 */

use crate::errors::ProviderError;
use crate::provider::Provider;
use crate::types::{CompletionRequest, ProviderResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{instrument, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: i64 = 4096;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .expect("reqwest client must build"),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub fn anthropic(api_key: String) -> Self {
        Self::new(api_key, "https://api.anthropic.com")
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError> {
        let mut system_prompt: Option<String> = None;
        let mut messages = Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            if message.role == "system" {
                system_prompt = Some(message.content.clone());
            } else {
                messages.push(json!({"role": message.role, "content": message.content}));
            }
        }

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(system) = system_prompt {
            body["system"] = json!(system);
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            warn!("🛑 [ANTHROPIC_REJECT]: status {} body {}", status, text);
            return Err(ProviderError::UpstreamRejection { status: status.as_u16(), body: text });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::DecodingFault(e.to_string()))?;

        let content = payload["content"][0]["text"].as_str().unwrap_or_default().to_string();
        let input_tokens = payload["usage"]["input_tokens"].as_i64().unwrap_or(0);
        let output_tokens = payload["usage"]["output_tokens"].as_i64().unwrap_or(0);

        Ok(ProviderResponse {
            content,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            raw_metadata: payload,
        })
    }
}
