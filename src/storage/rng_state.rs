//! Selector generator snapshot persistence

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{read_json_lenient, write_json_atomic, StorageResult};

/// Position of a ChaCha8 generator: seed, stream and word offset
///
/// `word_pos` is kept as a decimal string because it is a 128-bit counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub seed: [u8; 32],
    pub stream: u64,
    word_pos: String,
}

impl RngSnapshot {
    /// Build a snapshot from generator parts
    pub fn new(seed: [u8; 32], stream: u64, word_pos: u128) -> Self {
        Self {
            seed,
            stream,
            word_pos: word_pos.to_string(),
        }
    }

    /// Word offset within the stream; malformed values restart at zero
    pub fn word_pos(&self) -> u128 {
        self.word_pos.parse().unwrap_or_else(|_| {
            tracing::warn!(word_pos = %self.word_pos, "Invalid generator offset, restarting stream");
            0
        })
    }
}

/// File-backed store for the [`RngSnapshot`]
#[derive(Debug, Clone)]
pub struct RngStateStore {
    path: PathBuf,
}

impl RngStateStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last snapshot, if any
    pub fn load(&self) -> Option<RngSnapshot> {
        read_json_lenient(&self.path)
    }

    /// Atomically overwrite the snapshot
    pub fn save(&self, snapshot: &RngSnapshot) -> StorageResult<()> {
        write_json_atomic(&self.path, snapshot)
    }
}
