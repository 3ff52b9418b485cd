// [libs/infra/providers/src/errors.rs]
//! =================================================================
//! APARATO: PROVIDER CLIENT ERRORS (ESTRATO L3)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE COMUNICACIÓN
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("NETWORK_UNREACHABLE: {0}")]
    NetworkFault(#[from] reqwest::Error),

    #[error("ENVELOPE_CORRUPTION: {0}")]
    DecodingFault(String),

    #[error("COMMAND_REJECTION: upstream returned status {status}: {body}")]
    UpstreamRejection { status: u16, body: String },

    #[error("UNKNOWN_PROVIDER: '{0}' has no registered driver")]
    UnknownProvider(String),

    #[error("CREDENTIAL_FAULT: {0}")]
    CredentialFault(String),
}
