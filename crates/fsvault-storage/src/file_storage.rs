use std::sync::Arc;

use fsvault_core::{cipher::CipherError, fs::FsError, StorageError};
use tracing::{debug, instrument, warn};

use crate::{callback::CallbackStorage, context::StorageContext, fs::document_directory, path};

/// Folder created under the location when none is given.
pub const DEFAULT_FOLDER: &str = "persistStore";

/// Encrypted key-value storage with one file per key under a base folder.
///
/// Layout on disk: `<location>/<folder>/<percent-encoded key>`, each file
/// holding the ciphertext of its value. Cloning is cheap and clones share the
/// base folder and context.
#[derive(Clone)]
pub struct FileStorage {
    context: Arc<StorageContext>,
    base_folder: String,
}

impl FileStorage {
    /// Build a handle rooted at `location/folder`. `location` defaults to the
    /// platform document directory and `folder` to [`DEFAULT_FOLDER`].
    pub fn new(
        context: Arc<StorageContext>,
        location: Option<&str>,
        folder: Option<&str>,
    ) -> Result<Self, StorageError> {
        let location = match location {
            Some(location) => location.to_string(),
            None => document_directory().ok_or(StorageError::NoDocumentRoot)?,
        };
        let base_folder = path::resolve([location.as_str(), folder.unwrap_or(DEFAULT_FOLDER)]);
        Ok(Self {
            context,
            base_folder,
        })
    }

    /// Handle on the process-wide context at the default location and folder.
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageContext::shared(), None, None)
    }

    pub fn base_folder(&self) -> &str {
        &self.base_folder
    }

    /// Path of the file backing `key`.
    pub fn path_for_key(&self, key: &str) -> String {
        path::resolve([self.base_folder.as_str(), path::escape_key(key).as_str()])
    }

    /// Error-first callback view over this handle.
    pub fn callbacks(&self) -> CallbackStorage<'_> {
        CallbackStorage::new(self)
    }

    /// Encrypt `value` and store it under `key`, replacing any previous value.
    #[instrument(skip_all, fields(folder = %self.base_folder))]
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_entry(key, value)
            .await
            .map_err(StorageError::set_item)
    }

    /// Decrypted value for `key`, or `None` when nothing is stored.
    #[instrument(skip_all, fields(folder = %self.base_folder))]
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read_entry(key).await.map_err(StorageError::get_item)
    }

    /// Delete the entry for `key`; a missing entry is not an error.
    #[instrument(skip_all, fields(folder = %self.base_folder))]
    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.context
            .filesystem()
            .delete(&self.path_for_key(key), true)
            .await?;
        Ok(())
    }

    /// Every stored key, in directory listing order.
    #[instrument(skip_all, fields(folder = %self.base_folder))]
    pub async fn get_all_keys(&self) -> Result<Vec<String>, StorageError> {
        self.ensure_base_folder().await?;
        let names = self
            .context
            .filesystem()
            .list_dir(&self.base_folder)
            .await?;
        // Escaped keys never start with '.', so dot files are temp files or
        // platform clutter.
        Ok(names
            .iter()
            .filter(|name| !name.starts_with('.'))
            .map(|name| path::unescape_key(name))
            .collect())
    }

    async fn write_entry(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_base_folder().await?;
        let secret = self.context.encryption_key().get_or_create().await?;
        let ciphertext = self
            .context
            .cipher()
            .encrypt(value, secret)
            .map_err(StorageError::Encrypt)?;
        self.context
            .filesystem()
            .write(&self.path_for_key(key), &ciphertext)
            .await?;
        Ok(())
    }

    async fn read_entry(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for_key(key);
        let fs = self.context.filesystem();
        if !fs.stat(&path).await?.exists {
            return Ok(None);
        }

        let ciphertext = fs.read_to_string(&path).await?;
        let secret = self.context.encryption_key().get_or_create().await?;
        let plaintext = self.open(&ciphertext, secret).map_err(|err| {
            warn!(error = %err, "stored entry did not decrypt under the current key");
            StorageError::Decrypt(err)
        })?;
        Ok(Some(plaintext))
    }

    fn open(&self, ciphertext: &str, secret: &str) -> Result<String, CipherError> {
        let cipher = self.context.cipher();
        let bytes = cipher.decrypt(ciphertext, secret)?;
        cipher.decode(bytes)
    }

    async fn ensure_base_folder(&self) -> Result<(), FsError> {
        let fs = self.context.filesystem();
        if !fs.stat(&self.base_folder).await?.exists {
            debug!(folder = %self.base_folder, "creating base folder");
            fs.mkdir(&self.base_folder, true).await?;
        }
        Ok(())
    }
}
