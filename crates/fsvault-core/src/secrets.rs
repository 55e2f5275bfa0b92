use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by secret store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretStoreError {
    /// The platform secure storage could not be reached or refused the request.
    #[error("secure store unavailable: {reason}")]
    Unavailable { reason: String },
    /// Any other failure reported by the backend.
    #[error("secure store failure: {reason}")]
    Backend { reason: String },
}

/// Platform-protected storage for a small number of named secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by name; `None` when no secret has been stored yet.
    async fn get_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError>;

    /// Store a secret under a name, replacing any previous value.
    async fn set_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError>;
}

/// In-memory secret store for tests and ephemeral sessions.
/// Clones share the same backing map, so a test can tamper with secrets
/// seen by a running storage context.
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|err| SecretStoreError::Backend {
                reason: format!("lock poisoned: {err}"),
            })?;
        Ok(map.get(name).cloned())
    }

    async fn set_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|err| SecretStoreError::Backend {
                reason: format!("lock poisoned: {err}"),
            })?;
        map.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
