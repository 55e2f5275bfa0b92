use thiserror::Error;

use crate::{cipher::CipherError, fs::FsError, secrets::SecretStoreError};

/// Error returned by FileStorage operations.
///
/// The display text carries the operation prefix (`Error setting item: ...`,
/// `Error getting item: ...`); wrapped causes stay reachable through
/// [`std::error::Error::source`] and [`StorageError::root`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Error setting item: {0}")]
    SetItem(#[source] Box<StorageError>),
    #[error("Error getting item: {0}")]
    GetItem(#[source] Box<StorageError>),
    #[error("Error getting encryption key: {0}")]
    EncryptionKey(#[from] SecretStoreError),
    #[error("Could not decrypt state: {0}")]
    Decrypt(#[source] CipherError),
    /// Encrypting a value failed; the key itself was available.
    #[error("Could not encrypt state: {0}")]
    Encrypt(#[source] CipherError),
    #[error(transparent)]
    Io(#[from] FsError),
    /// No location was given and the platform exposes no document directory.
    #[error("no persistent document directory available")]
    NoDocumentRoot,
}

impl StorageError {
    pub fn set_item(inner: StorageError) -> Self {
        StorageError::SetItem(Box::new(inner))
    }

    pub fn get_item(inner: StorageError) -> Self {
        StorageError::GetItem(Box::new(inner))
    }

    /// Innermost error after peeling the operation wrappers.
    pub fn root(&self) -> &StorageError {
        match self {
            StorageError::SetItem(inner) | StorageError::GetItem(inner) => inner.root(),
            other => other,
        }
    }

    /// True when the failure came from ciphertext that would not decrypt
    /// or decode under the current key.
    pub fn is_decrypt(&self) -> bool {
        matches!(self.root(), StorageError::Decrypt(_))
    }
}
