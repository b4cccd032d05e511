//! Versioned snapshot envelope.
//!
//! Blobs are JSON documents of the form `{"state": ..., "version": N}`.
//! Writers that never declared a version store `0`; those blobs are read as
//! the current version.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{BlobStore, PersistenceError, PersistenceResult};

/// Version recorded by writers that never declared one
pub const UNVERSIONED: u32 = 0;

/// Envelope wrapping a store's persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub state: T,
    pub version: u32,
}

/// Load and decode the snapshot stored under `name`.
///
/// Returns `Ok(None)` when nothing has been saved yet. A blob marked
/// `UNVERSIONED` is decoded as `version`.
///
/// # Errors
/// Returns `PersistenceError::Serialization` for a corrupt blob and
/// `PersistenceError::VersionMismatch` when the blob was written with a
/// different `version`.
pub fn load_snapshot<T: DeserializeOwned>(
    backend: &dyn BlobStore,
    name: &str,
    version: u32,
) -> PersistenceResult<Option<T>> {
    let Some(blob) = backend.load(name)? else {
        return Ok(None);
    };

    let raw: Snapshot<serde_json::Value> = serde_json::from_str(&blob)?;
    if raw.version != version && raw.version != UNVERSIONED {
        return Err(PersistenceError::VersionMismatch {
            name: name.to_string(),
            expected: version,
            found: raw.version,
        });
    }

    let state = serde_json::from_value(raw.state)?;
    Ok(Some(state))
}

/// Encode `state` and save it under `name`.
///
/// # Errors
/// Returns a `PersistenceError` if encoding or the backend write fails.
pub fn save_snapshot<T: Serialize>(
    backend: &dyn BlobStore,
    name: &str,
    version: u32,
    state: &T,
) -> PersistenceResult<()> {
    let blob = serde_json::to_string(&Snapshot { state, version })?;
    backend.save(name, &blob)
}
