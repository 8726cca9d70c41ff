//! Binary snapshots of a whole [`PopulationStore`].
//!
//! A snapshot holds every attribute array, every contact layer, the
//! transmission ledger and the parameters.  The encoding is bincode behind a
//! format version; restoring yields a store equal (`==`) to the one saved.

use std::fs;
use std::path::Path;

use cv_people::PopulationStore;

use crate::{OutputError, OutputResult};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(serde::Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    store:   &'a PopulationStore,
}

#[derive(serde::Deserialize)]
struct SnapshotFile {
    version: u32,
    store:   PopulationStore,
}

/// Encode `store` as an opaque versioned blob.
pub fn to_bytes(store: &PopulationStore) -> OutputResult<Vec<u8>> {
    let snap = SnapshotRef { version: SNAPSHOT_VERSION, store };
    Ok(bincode::serialize(&snap)?)
}

/// Decode a blob produced by [`to_bytes`].
///
/// The decoded store is strictly validated, so a blob whose attribute
/// lengths disagree with its population size is rejected.
pub fn from_bytes(bytes: &[u8]) -> OutputResult<PopulationStore> {
    let snap: SnapshotFile = bincode::deserialize(bytes)?;
    if snap.version > SNAPSHOT_VERSION {
        return Err(OutputError::Version {
            found:     snap.version,
            supported: SNAPSHOT_VERSION,
        });
    }
    let mut store = snap.store;
    store.validate(true)?;
    Ok(store)
}

/// Write a snapshot of `store` to `path`.
pub fn save_snapshot(store: &PopulationStore, path: &Path) -> OutputResult<()> {
    let bytes = to_bytes(store)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), people = store.len(), "saving snapshot");
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> OutputResult<PopulationStore> {
    let bytes = fs::read(path)?;
    let store = from_bytes(&bytes)?;
    tracing::debug!(path = %path.display(), people = store.len(), "loaded snapshot");
    Ok(store)
}
