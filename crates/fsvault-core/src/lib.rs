//! Core abstractions for fsvault: the collaborator contracts FileStorage is
//! built on (filesystem, secret store, cipher) and the shared error taxonomy.
//! In-memory implementations are provided for tests and smoke runs.

pub mod cipher;
pub mod error;
pub mod fs;
pub mod secrets;

pub use error::StorageError;
