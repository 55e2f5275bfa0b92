use thiserror::Error;

/// Errors produced by cipher implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("encrypt failed: {reason}")]
    Encrypt { reason: String },
    #[error("decrypt failed: {reason}")]
    Decrypt { reason: String },
    #[error("decoded bytes are not valid text: {reason}")]
    Decode { reason: String },
}

/// String-based symmetric cipher. Ciphertext is whatever string the
/// implementation emits; only the same implementation is expected to read it.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext` under `key`.
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, CipherError>;

    /// Decrypt `ciphertext` under `key` into raw bytes.
    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<Vec<u8>, CipherError>;

    /// Decode decrypted bytes as text.
    fn decode(&self, bytes: Vec<u8>) -> Result<String, CipherError> {
        String::from_utf8(bytes).map_err(|e| CipherError::Decode {
            reason: e.to_string(),
        })
    }
}
