use std::sync::Arc;

use color_eyre::Result;
use fsvault_storage::{FileStorage, StorageContext};
use tracing::debug;

use crate::config::Config;

/// Build a storage handle from config. A custom keyring service gets its own
/// context; otherwise the process-wide context is used.
pub fn storage_from_config(config: &Config) -> Result<FileStorage> {
    let context = match &config.keyring_service {
        Some(service) => Arc::new(StorageContext::production(service)),
        None => StorageContext::shared(),
    };
    let storage = FileStorage::new(context, config.location.as_deref(), config.folder.as_deref())?;
    debug!(folder = storage.base_folder(), "initializing encrypted store");
    Ok(storage)
}

/// Helper for tests: storage on an in-memory filesystem and secret store.
#[cfg(test)]
pub fn test_storage() -> FileStorage {
    FileStorage::new(Arc::new(StorageContext::in_memory()), Some("/test"), None)
        .expect("in-memory storage")
}
