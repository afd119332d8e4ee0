use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stoik::config::Config;

mod commands;

// Translations for CLI output; the library declares its own backend
rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(
    name = "stoik",
    version,
    about = "Posts paragraphs from a text corpus to a Telegram channel on a daily schedule",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: scheduled posts plus the chat menu (default)
    Run,

    /// Publish one paragraph now and exit
    Post,

    /// Show or change the posting times
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Forget which paragraphs were already published
    ResetUsed,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Print the posting times and the next publication
    Show,

    /// Replace the posting times, e.g. `schedule set 09:00 18:00`
    Set {
        /// One or two times in HH:MM
        times: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;
    stoik::i18n::init_from_env(&config.logging.language);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        locale = %stoik::i18n::current_locale(),
        "stoik starting"
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!(channel = %config.telegram.channel_id, "Starting run command");
            commands::run(config).await?;
        }

        Commands::Post => {
            tracing::info!(channel = %config.telegram.channel_id, "Starting post command");
            commands::post(config).await?;
        }

        Commands::Schedule { action } => match action {
            ScheduleAction::Show => commands::show_schedule(&config)?,
            ScheduleAction::Set { times } => {
                tracing::info!(times = ?times, "Starting schedule set command");
                commands::set_schedule(&config, &times)?;
            }
        },

        Commands::ResetUsed => commands::reset_used(&config)?,
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("stoik=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("stoik={level},warn"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stoik=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
