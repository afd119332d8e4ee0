//! Paragraph corpus loading and selection
//!
//! The corpus is a plain UTF-8 text file whose paragraphs are separated by a
//! blank line. It is re-read on every selection so edits to the file are
//! picked up without a restart.
//!
//! # Modules
//!
//! - [`sanitize`] - Page-number and footnote stripping
//! - [`selector`] - Random selection of unused paragraphs

pub mod sanitize;
pub mod selector;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use sanitize::strip_page_numbers;
pub use selector::{ParagraphSelector, Selection, DEFAULT_MIN_PARAGRAPH_LENGTH};

/// Errors produced while loading the corpus or selecting from it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    /// Corpus file could not be read
    #[error("Corpus source unavailable at {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// Corpus contains no paragraphs at all
    #[error("Corpus contains no paragraphs")]
    EmptyCorpus,

    /// Every paragraph has already been published
    #[error("All paragraphs have already been published")]
    AllExhausted,

    /// Unused paragraphs exist but none is long enough
    #[error("No unused paragraph is at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Chosen paragraph is empty once page numbers are stripped
    #[error("Selected paragraph is blank after cleaning")]
    BlankText,
}

impl CorpusError {
    /// Get localized description for user-facing messages
    pub fn localized_desc(&self) -> String {
        match self {
            Self::SourceUnavailable { reason, .. } => {
                crate::i18n::t!("errors.corpus.source_unavailable", reason = reason).to_string()
            }
            Self::EmptyCorpus => crate::i18n::t!("errors.corpus.empty").to_string(),
            Self::AllExhausted => crate::i18n::t!("errors.corpus.exhausted").to_string(),
            Self::TooShort { min_length } => {
                crate::i18n::t!("errors.corpus.too_short", min_length = min_length).to_string()
            }
            Self::BlankText => crate::i18n::t!("errors.corpus.blank").to_string(),
        }
    }

    /// Whether the condition may clear up without operator action
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

/// Reads the corpus file and splits it into paragraphs
#[derive(Debug, Clone)]
pub struct ParagraphStore {
    path: PathBuf,
}

impl ParagraphStore {
    /// Create a store backed by the given corpus file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the corpus file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all paragraphs in file order
    pub fn load(&self) -> Result<Vec<String>, CorpusError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to read corpus");
            CorpusError::SourceUnavailable {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let paragraphs = split_paragraphs(&text);
        tracing::debug!(
            path = %self.path.display(),
            paragraphs = paragraphs.len(),
            "Corpus loaded"
        );
        Ok(paragraphs)
    }
}

/// Split raw text into trimmed, non-empty paragraphs
///
/// Paragraphs are separated by a blank line. Windows line endings are
/// normalized first.
///
/// # Examples
///
/// ```
/// use stoik::corpus::split_paragraphs;
///
/// let parts = split_paragraphs("first\n\n  second  \n\n\n\nthird");
/// assert_eq!(parts, vec!["first", "second", "third"]);
/// ```
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
