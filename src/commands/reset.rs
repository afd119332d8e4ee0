use anyhow::{Context, Result};

use stoik::config::Config;
use stoik::i18n::t;
use stoik::storage::UsedSetStore;

/// Clear the used-paragraph set
pub fn reset_used(config: &Config) -> Result<()> {
    let store = UsedSetStore::new(&config.storage.used_paragraphs_path);
    let before = match store.load() {
        Ok(used) => used.len(),
        Err(e) => {
            tracing::warn!(error = %e, "Used paragraphs unreadable, clearing anyway");
            0
        }
    };

    store
        .reset()
        .with_context(|| format!("Failed to reset {}", store.path().display()))?;

    tracing::info!(cleared = before, "Used paragraphs reset");
    println!("{}", t!("cli.reset.done"));
    Ok(())
}
