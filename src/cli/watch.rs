use crate::config::{ScheduleSettings, Settings};
use crate::scheduler::Scheduler;
use crate::Result;
use colored::Colorize;

/// Check on a fixed interval until Ctrl-C
pub async fn run(settings: &Settings, schedule: &ScheduleSettings) -> Result<()> {
    let checker = settings.build_checker()?;
    let options = schedule.options();

    println!(
        "{}",
        format!(
            "👀 Watching {} every {} minute(s)",
            settings.metadata_url, schedule.interval_minutes
        )
        .cyan()
    );

    let runs = Scheduler::new(checker, options).run_forever().await;

    println!("{}", format!("👋 Stopped after {} run(s)", runs).yellow());
    Ok(())
}
