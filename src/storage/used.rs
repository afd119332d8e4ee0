//! Used-paragraph persistence

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::{read_json, write_json_atomic, StorageResult};

/// Paragraphs that have already been published, keyed by their original text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedSet(BTreeSet<String>);

impl UsedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a paragraph was already published
    pub fn contains(&self, paragraph: &str) -> bool {
        self.0.contains(paragraph)
    }

    /// Record a paragraph; returns `false` if it was already present
    pub fn insert(&mut self, paragraph: impl Into<String>) -> bool {
        self.0.insert(paragraph.into())
    }

    /// Number of recorded paragraphs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forget every recorded paragraph
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over recorded paragraphs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromIterator<String> for UsedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// File-backed store for the [`UsedSet`]
#[derive(Debug, Clone)]
pub struct UsedSetStore {
    path: PathBuf,
}

impl UsedSetStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the set
    ///
    /// An absent, empty or truncated file yields an empty set. A file that
    /// cannot be read or decoded otherwise is an error and is left untouched.
    pub fn load(&self) -> StorageResult<UsedSet> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Atomically overwrite the file with `used`
    pub fn save(&self, used: &UsedSet) -> StorageResult<()> {
        write_json_atomic(&self.path, used)?;
        tracing::debug!(path = %self.path.display(), count = used.len(), "Used paragraphs saved");
        Ok(())
    }

    /// Persist an empty set
    pub fn reset(&self) -> StorageResult<()> {
        self.save(&UsedSet::new())?;
        tracing::info!(path = %self.path.display(), "Used paragraphs reset");
        Ok(())
    }
}
