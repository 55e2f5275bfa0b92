use std::sync::{Arc, OnceLock};

use fsvault_core::{
    cipher::Cipher,
    fs::{FileSystem, InMemoryFileSystem},
    secrets::{InMemorySecretStore, SecretStore},
};

use crate::{
    cipher::AesGcmCipher,
    encryption_key::EncryptionKeyManager,
    fs::LocalFileSystem,
    secret_store::{KeyringSecretStore, DEFAULT_KEYRING_SERVICE},
};

static SHARED: OnceLock<Arc<StorageContext>> = OnceLock::new();

/// Collaborators and key cache shared by every [`crate::FileStorage`] built on
/// the same context. Handles with different base folders stay isolated on
/// disk but encrypt with the one key held here.
pub struct StorageContext {
    fs: Arc<dyn FileSystem>,
    secrets: Arc<dyn SecretStore>,
    cipher: Arc<dyn Cipher>,
    keys: EncryptionKeyManager,
}

impl StorageContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        secrets: Arc<dyn SecretStore>,
        cipher: Arc<dyn Cipher>,
    ) -> Self {
        Self {
            fs,
            keys: EncryptionKeyManager::new(secrets.clone()),
            secrets,
            cipher,
        }
    }

    /// Keep the encryption key under `name` in the same secret store.
    pub fn with_secret_name(self, name: &str) -> Self {
        Self {
            keys: EncryptionKeyManager::with_secret_name(self.secrets.clone(), name),
            ..self
        }
    }

    /// Local disk, OS keyring under `keyring_service`, AES-GCM.
    pub fn production(keyring_service: &str) -> Self {
        Self::new(
            Arc::new(LocalFileSystem),
            Arc::new(KeyringSecretStore::new(keyring_service)),
            Arc::new(AesGcmCipher),
        )
    }

    /// Fully in-memory context for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryFileSystem::new()),
            Arc::new(InMemorySecretStore::new()),
            Arc::new(AesGcmCipher),
        )
    }

    /// Process-wide production context, created on first use.
    pub fn shared() -> Arc<StorageContext> {
        SHARED
            .get_or_init(|| Arc::new(Self::production(DEFAULT_KEYRING_SERVICE)))
            .clone()
    }

    pub fn filesystem(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn cipher(&self) -> &dyn Cipher {
        self.cipher.as_ref()
    }

    pub fn encryption_key(&self) -> &EncryptionKeyManager {
        &self.keys
    }
}
