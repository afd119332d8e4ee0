use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use stoik::bot::{Controller, ControllerSettings, EVENT_QUEUE_CAPACITY};
use stoik::config::Config;
use stoik::delivery::{Channel, TelegramChannel};
use stoik::i18n::t;
use stoik::publish::Publisher;
use stoik::scheduler::ScheduleStore;
use stoik::telegram::{TelegramClient, UpdatePoller};

/// Run the bot until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    config.validate_for_service()?;

    let client = TelegramClient::new(&config.telegram).context("Failed to create Telegram client")?;

    let channel = Arc::new(
        TelegramChannel::new(client.clone(), config.telegram.channel_id.as_str())
            .context("Invalid channel configuration")?,
    );

    match channel.health_check().await {
        Ok(true) => tracing::debug!(channel = channel.name(), "Channel reachable"),
        Ok(false) => tracing::warn!("Token does not belong to a bot account"),
        Err(e) if e.is_retryable() => {
            tracing::warn!(error = %e, "Bot API unreachable at startup, continuing");
        }
        Err(e) => return Err(e).context("Bot API rejected the token"),
    }
    let publisher = Publisher::from_config(&config, channel);

    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = Controller::new(
        ControllerSettings::from_config(&config)?,
        ScheduleStore::new(&config.storage.schedule_path),
        publisher,
        Arc::new(client.clone()),
        event_tx.clone(),
    );

    if let Some(next) = controller.next_fire() {
        let offset = config.timezone()?;
        tracing::info!(
            next = %next.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            zone = %config.publishing.timezone_label,
            "Next scheduled publication"
        );
    }

    let poller = UpdatePoller::new(client, event_tx, config.telegram.poll_timeout_secs);
    let poller_handle = tokio::spawn(poller.run(shutdown_rx.clone()));
    let controller_handle = tokio::spawn(controller.run(event_rx, shutdown_rx));

    println!("{}", t!("cli.run.starting"));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to wait for Ctrl+C"),
    }

    if shutdown_tx.send(true).is_err() {
        tracing::debug!("All tasks already stopped");
    }

    for (name, handle) in [("poller", poller_handle), ("controller", controller_handle)] {
        if let Err(e) = handle.await {
            tracing::warn!(task = name, error = %e, "Task ended abnormally");
        }
    }

    println!("{}", t!("cli.run.stopped"));
    Ok(())
}
