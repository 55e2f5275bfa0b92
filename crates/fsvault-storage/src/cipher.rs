use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use fsvault_core::cipher::{Cipher, CipherError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// AES-256-GCM over a SHA-256 digest of the key string. The ciphertext string
/// is a JSON envelope holding the nonce and sealed bytes, both base64url.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmCipher;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    nonce: String,
    ciphertext: String,
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, CipherError> {
        let cipher = build_cipher(key).map_err(|reason| CipherError::Encrypt { reason })?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::Encrypt {
                reason: e.to_string(),
            })?;

        let envelope = Envelope {
            nonce: URL_SAFE_NO_PAD.encode(nonce.as_slice()),
            ciphertext: URL_SAFE_NO_PAD.encode(sealed),
        };
        serde_json::to_string(&envelope).map_err(|e| CipherError::Encrypt {
            reason: e.to_string(),
        })
    }

    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<Vec<u8>, CipherError> {
        let envelope: Envelope = serde_json::from_str(ciphertext).map_err(decrypt_err)?;
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(envelope.nonce)
            .map_err(decrypt_err)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::Decrypt {
                reason: format!("expected {NONCE_LEN}-byte nonce, got {}", nonce_bytes.len()),
            });
        }
        let sealed = URL_SAFE_NO_PAD
            .decode(envelope.ciphertext)
            .map_err(decrypt_err)?;

        let cipher = build_cipher(key).map_err(|reason| CipherError::Decrypt { reason })?;
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), sealed.as_ref())
            .map_err(decrypt_err)
    }
}

fn build_cipher(key: &str) -> Result<Aes256Gcm, String> {
    let digest = Sha256::digest(key.as_bytes());
    Aes256Gcm::new_from_slice(&digest).map_err(|e| format!("cipher init failed: {e}"))
}

fn decrypt_err<E: ToString>(err: E) -> CipherError {
    CipherError::Decrypt {
        reason: err.to_string(),
    }
}
