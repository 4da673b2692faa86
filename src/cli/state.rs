use crate::config::StoreSettings;
use crate::Result;
use colored::Colorize;

/// Print the persisted state
pub async fn run(store: &StoreSettings, json: bool) -> Result<()> {
    let manager = store.state_manager()?;
    let state = manager.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("{}", format!("State: {}", manager.location()).cyan().bold());
    println!();

    match state {
        Some(state) => {
            println!("   Production id: {}", state.last_production_id);
            println!("   Staging id:    {}", state.last_staging_id);
        }
        None => {
            println!("{}", "   No state recorded yet".yellow());
            println!();
            println!("{}", "💡 The next check will notify for both channels.".yellow());
        }
    }

    Ok(())
}
