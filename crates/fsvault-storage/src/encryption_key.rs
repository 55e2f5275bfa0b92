use std::sync::Arc;

use fsvault_core::{
    secrets::{SecretStore, SecretStoreError},
    StorageError,
};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Name of the secret holding the per-installation encryption key.
pub const DEFAULT_SECRET_NAME: &str = "persistStoreEncryptionKey";

/// Lazily loads or creates the encryption key and caches it for the life of
/// the owning context.
///
/// Initialization runs at most once at a time per manager; a failed attempt
/// leaves the cache empty so the next caller retries from the secret store.
/// Managers in different processes (or different contexts) that start from an
/// empty secret store can each create a key; the store keeps the last write.
pub struct EncryptionKeyManager {
    secrets: Arc<dyn SecretStore>,
    secret_name: String,
    cached: OnceCell<String>,
}

impl EncryptionKeyManager {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self::with_secret_name(secrets, DEFAULT_SECRET_NAME)
    }

    pub fn with_secret_name(secrets: Arc<dyn SecretStore>, secret_name: impl Into<String>) -> Self {
        Self {
            secrets,
            secret_name: secret_name.into(),
            cached: OnceCell::new(),
        }
    }

    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Whether a key is already cached.
    pub fn is_ready(&self) -> bool {
        self.cached.initialized()
    }

    /// Return the cached key, loading or creating it on first use.
    #[instrument(skip_all)]
    pub async fn get_or_create(&self) -> Result<&str, StorageError> {
        let key = self
            .cached
            .get_or_try_init(|| self.load_or_create())
            .await?;
        Ok(key.as_str())
    }

    async fn load_or_create(&self) -> Result<String, SecretStoreError> {
        if let Some(existing) = self.secrets.get_secret(&self.secret_name).await? {
            debug!(secret = %self.secret_name, "loaded encryption key");
            return Ok(existing);
        }

        let fresh = Uuid::new_v4().to_string();
        self.secrets.set_secret(&self.secret_name, &fresh).await?;
        debug!(secret = %self.secret_name, "created encryption key");
        Ok(fresh)
    }
}
