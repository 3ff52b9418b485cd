// [libs/domain/models/src/api_key.rs]
//! Platform API keys: `cpk_{base64url32}`. Plaintext is never stored — only
//! the SHA-256 hash and a display suffix survive past issuance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub name: String,
    /// SHA-256 hex digest of the full opaque token.
    pub key_hash: String,
    /// Last 8 characters of the plaintext token, for display only.
    pub key_suffix: String,
    pub is_active: bool,
    pub revoked_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
