// [libs/domain/models/src/credential.rs]
//! Organization-supplied provider credentials (BYOK) or platform-managed
//! markers. Encryption at rest is an external concern (Non-goal); this
//! crate only carries the shape the core reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialMode {
    Managed,
    Byok,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredential {
    pub id: Uuid,
    pub org_id: Uuid,
    pub provider: String,
    pub mode: CredentialMode,
    /// Ciphertext at rest; the core decrypts through a `Secrets` port before use.
    pub encrypted_api_key: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
