// [libs/infra/providers/src/registry.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER REGISTRY (ESTRATO L3)
 * RESPONSABILIDAD: INFERENCIA DE PROVEEDOR Y ADQUISICIÓN DE DRIVER
 *
 * Two acquisition paths: a platform-managed singleton client reused
 * across every request (the common case), or an ephemeral client built
 * fresh from a decrypted BYOK credential (never cached — the plaintext
 * key lives only for the duration of one call).
 * =================================================================
 */

use crate::crypto::CredentialCipher;
use crate::drivers::{AnthropicProvider, MockProvider, OpenAiProvider};
use crate::errors::ProviderError;
use crate::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use tollgate_domain_models::{CredentialMode, ProviderCredential};

/// Model name prefix -> provider name, ported from the original router's
/// `_infer_provider`.
pub fn infer_provider(model: &str) -> &'static str {
    if model.starts_with("gpt-") || model.starts_with("o1") || model.starts_with("o3") {
        "openai"
    } else if model.starts_with("claude-") {
        "anthropic"
    } else if model.starts_with("mock") {
        "mock"
    } else {
        "openai"
    }
}

pub struct ProviderRegistry {
    managed: HashMap<String, Arc<dyn Provider>>,
    cipher: CredentialCipher,
}

impl ProviderRegistry {
    /// Registers the platform's own managed drivers. `openai_api_key` /
    /// `anthropic_api_key` are `None` in a deployment that only serves
    /// BYOK traffic; `mock` is always available.
    pub fn bootstrap(
        openai_api_key: Option<String>,
        anthropic_api_key: Option<String>,
        cipher: CredentialCipher,
    ) -> Self {
        let mut managed: HashMap<String, Arc<dyn Provider>> = HashMap::new();
        managed.insert("mock".to_string(), Arc::new(MockProvider));
        if let Some(key) = openai_api_key {
            managed.insert("openai".to_string(), Arc::new(OpenAiProvider::openai(key)));
        }
        if let Some(key) = anthropic_api_key {
            managed.insert("anthropic".to_string(), Arc::new(AnthropicProvider::anthropic(key)));
        }
        Self { managed, cipher }
    }

    /// Acquire the driver for `provider_name`. If `credential` is `Some`
    /// and BYOK, builds a fresh client from the decrypted key; otherwise
    /// falls back to the platform-managed singleton.
    pub fn acquire(
        &self,
        provider_name: &str,
        credential: Option<&ProviderCredential>,
    ) -> Result<Arc<dyn Provider>, ProviderError> {
        if let Some(credential) = credential {
            if credential.mode == CredentialMode::Byok {
                let plaintext = self.cipher.decrypt(&credential.encrypted_api_key)?;
                return self.build_ephemeral(provider_name, plaintext);
            }
        }

        self.managed
            .get(provider_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(provider_name.to_string()))
    }

    fn build_ephemeral(&self, provider_name: &str, api_key: String) -> Result<Arc<dyn Provider>, ProviderError> {
        let provider: Arc<dyn Provider> = match provider_name {
            "openai" => Arc::new(OpenAiProvider::openai(api_key)),
            "anthropic" => Arc::new(AnthropicProvider::anthropic(api_key)),
            "mock" => Arc::new(MockProvider),
            other => return Err(ProviderError::UnknownProvider(other.to_string())),
        };
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_provider_from_model_prefix() {
        assert_eq!(infer_provider("gpt-4o"), "openai");
        assert_eq!(infer_provider("o1-preview"), "openai");
        assert_eq!(infer_provider("claude-3-5-sonnet"), "anthropic");
        assert_eq!(infer_provider("mock-small"), "mock");
        assert_eq!(infer_provider("some-unknown-model"), "openai");
    }

    #[tokio::test]
    async fn acquire_falls_back_to_managed_without_byok_credential() {
        let cipher = CredentialCipher::new(&fernet::Fernet::generate_key()).unwrap();
        let registry = ProviderRegistry::bootstrap(None, None, cipher);
        let provider = registry.acquire("mock", None);
        assert!(provider.is_ok());
    }

    #[tokio::test]
    async fn acquire_without_managed_driver_and_no_credential_fails() {
        let cipher = CredentialCipher::new(&fernet::Fernet::generate_key()).unwrap();
        let registry = ProviderRegistry::bootstrap(None, None, cipher);
        let provider = registry.acquire("openai", None);
        assert!(provider.is_err());
    }
}
