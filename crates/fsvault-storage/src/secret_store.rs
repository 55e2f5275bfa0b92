use async_trait::async_trait;
use fsvault_core::secrets::{SecretStore, SecretStoreError};

/// Service name under which fsvault secrets are filed in the OS keyring.
pub const DEFAULT_KEYRING_SERVICE: &str = "fsvault";

/// OS keyring-backed secret store. Each secret name is a keyring account
/// under one service.
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry, SecretStoreError> {
        keyring::Entry::new(&self.service, name).map_err(keyring_err)
    }
}

/// Keyring calls block on platform IPC, so they run on the blocking pool.
async fn blocking<T, F>(op: F) -> Result<T, SecretStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SecretStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(op).await.map_err(join_err)?
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEYRING_SERVICE)
    }
}

#[async_trait]
impl SecretStore for KeyringSecretStore {
    async fn get_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        let entry = self.entry(name)?;
        blocking(move || match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(keyring_err(err)),
        })
        .await
    }

    async fn set_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let entry = self.entry(name)?;
        let value = value.to_string();
        blocking(move || entry.set_password(&value).map_err(keyring_err)).await
    }
}

fn keyring_err(err: keyring::Error) -> SecretStoreError {
    match err {
        keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
            SecretStoreError::Unavailable {
                reason: err.to_string(),
            }
        }
        other => SecretStoreError::Backend {
            reason: other.to_string(),
        },
    }
}

fn join_err(err: tokio::task::JoinError) -> SecretStoreError {
    SecretStoreError::Backend {
        reason: format!("keyring task failed: {err}"),
    }
}
