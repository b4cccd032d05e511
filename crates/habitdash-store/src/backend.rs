//! Blob store trait and error types.
//!
//! This module defines the `BlobStore` trait that abstracts over the
//! storage implementations (in-memory, JSON files, SQLite).

use thiserror::Error;

/// Errors that can occur while loading or saving a blob.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite failure.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blob was written by an incompatible snapshot version.
    #[error("Snapshot version mismatch for {name}: expected {expected}, found {found}")]
    VersionMismatch {
        name: String,
        expected: u32,
        found: u32,
    },

    /// Backend cannot be reached (e.g. no data directory).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result type for backend operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Opaque key-value blob store keyed by a store name.
///
/// Implementations must round-trip exactly: a blob passed to `save` is
/// returned unchanged by the next `load` of the same name.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `name`.
    ///
    /// Returns `None` if nothing has been saved under that name.
    ///
    /// # Errors
    /// Returns a `PersistenceError` if the backend cannot be read.
    fn load(&self, name: &str) -> PersistenceResult<Option<String>>;

    /// Replace the blob stored under `name`.
    ///
    /// # Errors
    /// Returns a `PersistenceError` if the backend cannot be written.
    fn save(&self, name: &str, blob: &str) -> PersistenceResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn load(&self, name: &str) -> PersistenceResult<Option<String>> {
        (**self).load(name)
    }

    fn save(&self, name: &str, blob: &str) -> PersistenceResult<()> {
        (**self).save(name, blob)
    }
}
