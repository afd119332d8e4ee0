//! Random paragraph selection
//!
//! The selector owns a ChaCha8 generator. Its state is exported as an
//! [`RngSnapshot`] after every pick so that the random sequence continues
//! across restarts instead of being reseeded each run.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::sanitize::strip_page_numbers;
use super::CorpusError;
use crate::storage::{RngSnapshot, UsedSet};

/// Minimum paragraph length (in characters) eligible for publication
pub const DEFAULT_MIN_PARAGRAPH_LENGTH: usize = 50;

/// A paragraph chosen for publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Paragraph exactly as it appears in the corpus (the used-set key)
    pub original: String,

    /// Paragraph after page-number stripping (the text to deliver)
    pub text: String,
}

/// Picks unused paragraphs uniformly at random
#[derive(Debug, Clone)]
pub struct ParagraphSelector {
    rng: ChaCha8Rng,
    min_length: usize,
}

impl ParagraphSelector {
    /// Create a selector seeded from OS entropy
    pub fn new(min_length: usize) -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            min_length,
        }
    }

    /// Create a selector with a fixed seed
    pub fn with_seed(seed: u64, min_length: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min_length,
        }
    }

    /// Resume a generator from a persisted snapshot
    pub fn from_snapshot(snapshot: &RngSnapshot, min_length: usize) -> Self {
        let mut rng = ChaCha8Rng::from_seed(snapshot.seed);
        rng.set_stream(snapshot.stream);
        rng.set_word_pos(snapshot.word_pos());

        Self { rng, min_length }
    }

    /// Export the generator position
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot::new(
            self.rng.get_seed(),
            self.rng.get_stream(),
            self.rng.get_word_pos(),
        )
    }

    /// Minimum paragraph length in characters
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Choose one unused paragraph
    ///
    /// The used set is not modified here; the caller records
    /// [`Selection::original`] and persists it before delivering.
    pub fn select(
        &mut self,
        corpus: &[String],
        used: &UsedSet,
    ) -> Result<Selection, CorpusError> {
        if corpus.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        let available: Vec<&String> = corpus.iter().filter(|p| !used.contains(p)).collect();
        if available.is_empty() {
            return Err(CorpusError::AllExhausted);
        }

        let eligible: Vec<&String> = available
            .into_iter()
            .filter(|p| p.chars().count() >= self.min_length)
            .collect();

        let chosen = eligible
            .choose(&mut self.rng)
            .ok_or(CorpusError::TooShort {
                min_length: self.min_length,
            })?;

        Ok(Selection {
            original: (*chosen).clone(),
            text: strip_page_numbers(chosen),
        })
    }
}

impl Default for ParagraphSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PARAGRAPH_LENGTH)
    }
}
