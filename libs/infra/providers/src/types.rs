// [libs/infra/providers/src/types.rs]
//! Shared request/response shapes every driver normalizes to and from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_output_tokens: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
    pub raw_metadata: Value,
}
