use anyhow::{Context, Result};
use chrono::Utc;

use stoik::config::Config;
use stoik::i18n::t;
use stoik::scheduler::{next_fire_for_schedule, Schedule, ScheduleStore};

/// Print the stored posting times and the next publication
pub fn show_schedule(config: &Config) -> Result<()> {
    let offset = config.timezone()?;
    let schedule = ScheduleStore::new(&config.storage.schedule_path).load();

    println!(
        "{}",
        t!(
            "bot.schedule.current",
            times = schedule.display(),
            zone = &config.publishing.timezone_label
        )
    );

    if let Some((_, at)) = next_fire_for_schedule(Utc::now(), &schedule, offset) {
        let local = at.with_timezone(&offset).format("%Y-%m-%d %H:%M");
        println!("{}", t!("cli.schedule.next", at = local));
    }

    Ok(())
}

/// Validate and store new posting times
///
/// A running bot keeps its current fire tasks until restarted or until the
/// times are changed through `/settime`.
pub fn set_schedule(config: &Config, times: &[String]) -> Result<()> {
    let schedule = Schedule::parse_args(times).map_err(|e| anyhow::anyhow!(e.localized_desc()))?;

    let store = ScheduleStore::new(&config.storage.schedule_path);
    store
        .save(&schedule)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;

    tracing::info!(schedule = %schedule, "Schedule stored");
    println!(
        "{}",
        t!(
            "bot.schedule.updated",
            times = schedule.display(),
            zone = &config.publishing.timezone_label
        )
    );

    Ok(())
}
