use crate::checker::RunReport;
use crate::config::Settings;
use crate::models::Channel;
use crate::Result;
use colored::Colorize;

/// Run a single check and print what happened
pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    let checker = settings.build_checker()?;
    let report = checker.run().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    let metadata = &report.metadata;

    println!("{}", "🔍 Release versions".cyan().bold());
    println!();
    println!(
        "   Production: {} ({}, previous {})",
        metadata.production_version.green(),
        metadata.production_id,
        metadata.production_previous_version
    );
    println!(
        "   Staging:    {} ({})",
        metadata.staging_version.green(),
        metadata.staging_id
    );
    println!();

    if !report.changes.any() {
        println!("{}", "✅ No changes since the last check".green());
        return;
    }

    if report.first_run {
        println!("{}", "🆕 No previous state recorded".yellow());
    }

    for channel in report.changes.channels() {
        let status = if report.notified.contains(&channel) {
            "notified".green()
        } else {
            "notification failed".red()
        };
        println!("   {} changed: {}", label(channel), status);
    }

    if report.persisted {
        println!();
        println!("{}", "💾 State updated".cyan());
    }
}

fn label(channel: Channel) -> &'static str {
    match channel {
        Channel::Production => "Production",
        Channel::Staging => "Staging",
    }
}

fn report_json(report: &RunReport) -> serde_json::Value {
    serde_json::json!({
        "metadata": report.metadata,
        "firstRun": report.first_run,
        "productionChanged": report.changes.production_changed,
        "stagingChanged": report.changes.staging_changed,
        "notified": channel_names(&report.notified),
        "failedNotifications": channel_names(&report.failed_notifications),
        "persisted": report.persisted,
    })
}

fn channel_names(channels: &[Channel]) -> Vec<&'static str> {
    channels.iter().map(Channel::as_str).collect()
}
