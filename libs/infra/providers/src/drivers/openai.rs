// [libs/infra/providers/src/drivers/openai.rs]
/*!
 * =================================================================
 * APARATO: OPENAI-SHAPED DRIVER (ESTRATO L3)
 * RESPONSABILIDAD: WIRE FORMAT PARA /chat/completions
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

const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
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

    pub fn openai(api_key: String) -> Self {
        Self::new(api_key, "https://api.openai.com/v1")
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError> {
        let mut body = json!({
            "model": request.model,
            "messages": request.messages.iter().map(|m| json!({"role": m.role, "content": m.content})).collect::<Vec<_>>(),
        });
        if let Some(max_tokens) = request.max_output_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            warn!("🛑 [OPENAI_REJECT]: status {} body {}", status, text);
            return Err(ProviderError::UpstreamRejection { status: status.as_u16(), body: text });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::DecodingFault(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let input_tokens = payload["usage"]["prompt_tokens"].as_i64().unwrap_or(0);
        let output_tokens = payload["usage"]["completion_tokens"].as_i64().unwrap_or(0);
        let total_tokens = payload["usage"]["total_tokens"].as_i64().unwrap_or(input_tokens + output_tokens);

        Ok(ProviderResponse {
            content,
            input_tokens,
            output_tokens,
            total_tokens,
            raw_metadata: payload,
        })
    }
}
