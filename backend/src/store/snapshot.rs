//! Snapshot - Save/Load Room Store
//!
//! Serializes the whole room store to JSON so the CLI can persist ledgers
//! between invocations.
//!
//! # Critical Invariants
//!
//! - **Integrity**: The SHA-256 digest of the rooms must match on load
//! - **Versioning**: Only snapshots with a known format version are accepted
//! - **Uniqueness**: Each room id appears at most once
//! - **Lossless**: Buy-in history, cash-out state and settled flags round-trip

use crate::models::room::Room;
use crate::store::InMemoryRoomStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Snapshot digest mismatch: stored {stored}, computed {computed}")]
    DigestMismatch { stored: String, computed: String },

    #[error("Snapshot contains room {0} more than once")]
    DuplicateRoom(String),
}

/// Serialized form of a room store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,

    /// Rooms ordered by id
    pub rooms: Vec<Room>,

    /// Hex SHA-256 of the serialized rooms
    pub digest: String,
}

impl StoreSnapshot {
    /// Capture the current contents of a store
    pub fn capture(store: &InMemoryRoomStore) -> Result<Self, SnapshotError> {
        let rooms: Vec<Room> = store.rooms().cloned().collect();
        let digest = compute_digest(&rooms)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            rooms,
            digest,
        })
    }

    /// Check version, digest and room id uniqueness
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let computed = compute_digest(&self.rooms)?;
        if computed != self.digest {
            return Err(SnapshotError::DigestMismatch {
                stored: self.digest.clone(),
                computed,
            });
        }
        let mut seen = BTreeSet::new();
        for room in &self.rooms {
            if !seen.insert(room.id()) {
                return Err(SnapshotError::DuplicateRoom(room.id().to_string()));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a snapshot
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn into_store(self) -> InMemoryRoomStore {
        self.rooms.into_iter().collect()
    }
}

/// Hex-encoded SHA-256 of the canonical JSON encoding of `rooms`
pub fn compute_digest(rooms: &[Room]) -> Result<String, SnapshotError> {
    let bytes = serde_json::to_vec(rooms)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write a store to `path`
pub fn save(store: &InMemoryRoomStore, path: &Path) -> Result<(), SnapshotError> {
    let json = StoreSnapshot::capture(store)?.to_json()?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), rooms = store.len(), "snapshot saved");
    Ok(())
}

/// Read a store from `path`; a missing file yields an empty store
pub fn load(path: &Path) -> Result<InMemoryRoomStore, SnapshotError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(InMemoryRoomStore::new());
        }
        Err(err) => return Err(err.into()),
    };
    let store = StoreSnapshot::from_json(&json)?.into_store();
    tracing::debug!(path = %path.display(), rooms = store.len(), "snapshot loaded");
    Ok(store)
}
