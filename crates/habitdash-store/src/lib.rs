//! Persisted store backends for habitdash.
//!
//! A backend is an opaque key-value blob store keyed by store name. Stores
//! serialize their state into a versioned snapshot envelope and hand the
//! resulting text blob to whichever backend the application selected.

pub mod backend;
pub mod file;
pub mod memory;
pub mod snapshot;
pub mod sqlite;

pub use backend::{BlobStore, PersistenceError, PersistenceResult};
pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;
pub use snapshot::{load_snapshot, save_snapshot, Snapshot, UNVERSIONED};
pub use sqlite::SqliteBlobStore;
