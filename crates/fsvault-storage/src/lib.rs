//! Encrypted key-value persistence over per-key files.
//! Values are encrypted with AES-GCM under a per-installation key kept in the
//! OS keyring (or a test double) and cached once per [`context::StorageContext`].

pub mod callback;
pub mod cipher;
pub mod context;
pub mod encryption_key;
pub mod file_storage;
pub mod fs;
pub mod path;
pub mod secret_store;

pub use callback::CallbackStorage;
pub use context::StorageContext;
pub use file_storage::FileStorage;
