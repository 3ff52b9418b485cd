// [libs/infra/providers/src/provider.rs]
//! Every model provider behind one contract. The gateway never branches on
//! "which vendor" past acquisition time — it only ever calls `complete`.

use crate::errors::ProviderError;
use crate::types::{CompletionRequest, ProviderResponse};
use async_trait::async_trait;

#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError>;
}
