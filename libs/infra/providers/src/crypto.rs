// [libs/infra/providers/src/crypto.rs]
/*!
 * =================================================================
 * APARATO: BYOK SECRET CIPHER (ESTRATO L3)
 * RESPONSABILIDAD: CIFRADO/DESCIFRADO DE CLAVES DE PROVEEDOR
 *
 * Same construction the platform's key vault uses at rest (Fernet:
 * authenticated, versioned, timestamped symmetric encryption). The
 * master key is an operational secret (`TOLLGATE_CREDENTIAL_KEY`), never
 * a compile-time constant.
 * =================================================================
 */

use crate::errors::ProviderError;
use fernet::Fernet;

pub struct CredentialCipher {
    fernet: Fernet,
}

impl CredentialCipher {
    pub fn new(master_key: &str) -> Result<Self, ProviderError> {
        let fernet = Fernet::new(master_key)
            .ok_or_else(|| ProviderError::CredentialFault("malformed master key".into()))?;
        Ok(Self { fernet })
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.fernet.encrypt(plaintext.as_bytes())
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, ProviderError> {
        let bytes = self
            .fernet
            .decrypt(ciphertext)
            .map_err(|_| ProviderError::CredentialFault("decrypt failed: invalid or tampered ciphertext".into()))?;
        String::from_utf8(bytes).map_err(|e| ProviderError::CredentialFault(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_secret() {
        let key = Fernet::generate_key();
        let cipher = CredentialCipher::new(&key).unwrap();
        let ciphertext = cipher.encrypt("sk-live-abc123");
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), "sk-live-abc123");
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let key = Fernet::generate_key();
        let cipher = CredentialCipher::new(&key).unwrap();
        let mut ciphertext = cipher.encrypt("sk-live-abc123");
        ciphertext.push('x');
        assert!(cipher.decrypt(&ciphertext).is_err());
    }
}
