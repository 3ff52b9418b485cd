// [libs/infra/providers/src/lib.rs]
/*!
 * =================================================================
 * CRATE: tollgate-infra-providers (ESTRATO L3)
 * RESPONSABILIDAD: DRIVERS DE PROVEEDOR Y CIFRADO DE CREDENCIALES BYOK
 *
 * Everything that talks to an upstream model vendor over the network,
 * or handles the secrets needed to do so, lives here. Core engine
 * crates never import `reqwest` or `fernet` directly — they see only
 * the `Provider` trait.
 * =================================================================
 */

pub mod crypto;
pub mod drivers;
pub mod errors;
pub mod provider;
pub mod registry;
pub mod types;

pub use crypto::CredentialCipher;
pub use drivers::{AnthropicProvider, MockProvider, OpenAiProvider};
pub use errors::ProviderError;
pub use provider::Provider;
pub use registry::{infer_provider, ProviderRegistry};
pub use types::{ChatMessage, CompletionRequest, ProviderResponse};
