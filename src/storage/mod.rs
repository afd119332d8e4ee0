//! Durable state for the publisher
//!
//! Both stores write JSON through a temporary file followed by a rename, so a
//! crash mid-write leaves either the old or the new content on disk, never a
//! truncated file.
//!
//! - [`used`] - Set of paragraphs that were already published
//! - [`rng_state`] - Selector generator snapshot

pub mod rng_state;
pub mod used;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use rng_state::{RngSnapshot, RngStateStore};
pub use used::{UsedSet, UsedSetStore};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while persisting state
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State could not be encoded or decoded
    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the file involved
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Serialization { path, .. } => path,
        }
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub(crate) fn write_json_atomic<T: serde::Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        StorageError::Serialization {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    writer.flush().map_err(|e| StorageError::io(&temp_path, e))?;
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| StorageError::io(path, e))?;

    tracing::debug!(path = %path.display(), "State saved");
    Ok(())
}

/// Read a JSON file that must not be silently discarded
///
/// Absent and empty files, and files cut short mid-document (a decode error
/// at end of input), yield `None`. Any other read or decode failure is an
/// error, so the caller never overwrites content it could not understand.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_eof() => {
            tracing::warn!(path = %path.display(), error = %e, "State file truncated, starting empty");
            Ok(None)
        }
        Err(e) => Err(StorageError::Serialization {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Like [`read_json`], but every failure is logged and yields `None`
pub(crate) fn read_json_lenient<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    read_json(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable state file");
        None
    })
}
