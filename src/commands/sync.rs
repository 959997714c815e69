use std::path::Path;

use anyhow::Result;
use hearth_core::{Hearth, SyncOutcome, SyncStatus, SyncTarget};

pub async fn run(hearth: &Hearth, data_dir: &Path, calendar: Option<&str>) -> Result<()> {
    let target = match calendar {
        Some(id) => SyncTarget::Calendar(id.to_string()),
        None => SyncTarget::All,
    };

    let results = hearth.trigger_sync(target).await;
    if results.is_empty() {
        println!("Nothing to sync (no enabled calendars)");
        return Ok(());
    }

    let mut failures = 0;
    for (id, result) in &results {
        match result {
            Ok(SyncOutcome::Completed(stats)) => {
                println!(
                    "{id}: {} events stored ({} fetched, {} dropped)",
                    stats.stored, stats.fetched, stats.dropped
                );
            }
            Ok(SyncOutcome::AlreadySyncing) => println!("{id}: already syncing, skipped"),
            Ok(SyncOutcome::Disabled) => println!("{id}: sync disabled, skipped"),
            Err(err) => {
                failures += 1;
                println!("{id}: FAILED ({err}) - keeping previously stored events");
            }
        }
    }

    hearth.save(data_dir)?;

    if failures > 0 {
        anyhow::bail!("{failures} calendar(s) failed to sync");
    }
    Ok(())
}

pub fn status(hearth: &Hearth) -> Result<()> {
    let registry = hearth.get_registry();
    if registry.is_empty() {
        println!("No calendars");
        return Ok(());
    }

    for cal in registry {
        let status = hearth.get_sync_status(&cal.id);
        let line = match status {
            SyncStatus::Idle => match cal.last_sync {
                Some(at) => format!("idle (last synced {})", at.format("%Y-%m-%d %H:%M UTC")),
                None => "idle (never synced)".to_string(),
            },
            SyncStatus::Syncing => "syncing...".to_string(),
            SyncStatus::Success { at, stored, dropped } => format!(
                "synced {} ({stored} stored, {dropped} dropped)",
                at.format("%H:%M:%S")
            ),
            SyncStatus::Error(err) => format!("error: {err}"),
        };
        println!("{}: {line}", cal.id);
    }
    Ok(())
}
