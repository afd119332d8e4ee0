use anyhow::{Context, Result};
use std::sync::Arc;

use stoik::config::Config;
use stoik::delivery::TelegramChannel;
use stoik::error::StoikErrorTrait;
use stoik::i18n::t;
use stoik::publish::Publisher;
use stoik::telegram::TelegramClient;

/// Publish one paragraph and exit
pub async fn post(config: Config) -> Result<()> {
    config.validate_for_service()?;

    let client = TelegramClient::new(&config.telegram).context("Failed to create Telegram client")?;
    let channel = Arc::new(TelegramChannel::new(client, config.telegram.channel_id.as_str())?);
    let mut publisher = Publisher::from_config(&config, channel);

    match publisher.publish().await {
        Ok(published) => {
            println!(
                "{}",
                t!(
                    "cli.post.published",
                    chars = published.selection.text.chars().count()
                )
            );
            Ok(())
        }
        Err(e) => {
            let desc = e.localized_desc();
            Err(anyhow::Error::new(e).context(desc))
        }
    }
}
