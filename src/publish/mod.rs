//! Publish action
//!
//! One publication is: load the used set, load the corpus, pick a paragraph,
//! record it as used, persist the generator, deliver the cleaned text.
//! The used set is written before delivery, so a paragraph whose delivery
//! fails stays used and is never posted twice.

use std::sync::Arc;

use crate::config::Config;
use crate::corpus::{CorpusError, ParagraphSelector, ParagraphStore, Selection};
use crate::delivery::{Channel, DeliveryStatus};
use crate::error::{Error, Result};
use crate::storage::{RngStateStore, UsedSetStore};
use crate::utils::preview;

/// Outcome of a successful publication
#[derive(Debug, Clone)]
pub struct Published {
    /// Paragraph that was delivered
    pub selection: Selection,

    /// Delivery report from the channel
    pub status: DeliveryStatus,
}

/// Selects and delivers paragraphs
pub struct Publisher {
    corpus: ParagraphStore,
    used: UsedSetStore,
    rng_state: RngStateStore,
    selector: ParagraphSelector,
    channel: Arc<dyn Channel>,
}

impl Publisher {
    pub fn new(
        corpus: ParagraphStore,
        used: UsedSetStore,
        rng_state: RngStateStore,
        selector: ParagraphSelector,
        channel: Arc<dyn Channel>,
    ) -> Self {
        Self {
            corpus,
            used,
            rng_state,
            selector,
            channel,
        }
    }

    /// Build a publisher from config, resuming the persisted generator
    pub fn from_config(config: &Config, channel: Arc<dyn Channel>) -> Self {
        let rng_state = RngStateStore::new(&config.storage.random_state_path);
        let selector = restore_selector(&rng_state, config.publishing.min_paragraph_length);

        Self::new(
            ParagraphStore::new(&config.storage.corpus_path),
            UsedSetStore::new(&config.storage.used_paragraphs_path),
            rng_state,
            selector,
            channel,
        )
    }

    /// Pick the next paragraph and persist the bookkeeping
    ///
    /// Fails without side effects on corpus errors or an unreadable used
    /// set. If the used set cannot be saved the selection is discarded.
    pub fn select_next(&mut self) -> Result<Selection> {
        let mut used = self.used.load()?;
        let corpus = self.corpus.load()?;

        let selection = self.selector.select(&corpus, &used)?;
        used.insert(selection.original.clone());
        self.used.save(&used)?;

        if let Err(e) = self.rng_state.save(&self.selector.snapshot()) {
            tracing::warn!(error = %e, "Failed to persist generator state");
        }

        tracing::debug!(
            used = used.len(),
            corpus = corpus.len(),
            paragraph = %preview(&selection.original, 60),
            "Paragraph selected"
        );

        if selection.text.trim().is_empty() {
            return Err(CorpusError::BlankText.into());
        }

        Ok(selection)
    }

    /// Select one paragraph and deliver it
    pub async fn publish(&mut self) -> Result<Published> {
        let selection = self.select_next()?;

        let status = self
            .channel
            .deliver(&selection.text)
            .await
            .map_err(Error::Delivery)?;

        tracing::info!(
            channel = self.channel.name(),
            chars = selection.text.chars().count(),
            status = %status,
            "Paragraph published"
        );

        Ok(Published { selection, status })
    }

    /// Forget every published paragraph
    pub fn reset_used(&self) -> Result<()> {
        self.used.reset()?;
        tracing::info!(path = %self.used.path().display(), "Used paragraphs reset");
        Ok(())
    }

    /// Number of paragraphs already published
    pub fn used_count(&self) -> Result<usize> {
        Ok(self.used.load()?.len())
    }
}

/// Resume the generator from its snapshot, or seed a fresh one
pub fn restore_selector(store: &RngStateStore, min_length: usize) -> ParagraphSelector {
    match store.load() {
        Some(snapshot) => {
            tracing::debug!(path = %store.path().display(), "Generator state restored");
            ParagraphSelector::from_snapshot(&snapshot, min_length)
        }
        None => {
            tracing::info!(path = %store.path().display(), "No generator state, seeding from entropy");
            ParagraphSelector::new(min_length)
        }
    }
}
