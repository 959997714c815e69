use std::path::Path;

use anyhow::Result;
use hearth_core::{CalendarConfig, Hearth, Source};

pub fn list(hearth: &Hearth) -> Result<()> {
    let registry = hearth.get_registry();
    let selection = hearth.get_selection();

    if registry.is_empty() {
        println!("No calendars yet. Add one with:\n  hearth-cli add <name>");
        return Ok(());
    }

    for cal in registry {
        let mark = if selection.contains(&cal.id) { "x" } else { " " };
        let state = if !cal.configured {
            " (orphaned)"
        } else if !cal.enabled {
            " (sync off)"
        } else {
            ""
        };
        println!(
            "[{mark}] {}  {} events{state}\n    id: {}",
            cal, cal.event_count, cal.id
        );
    }
    Ok(())
}

pub fn add(
    hearth: &Hearth,
    data_dir: &Path,
    name: &str,
    source: Source,
    url: Option<String>,
    frequency: u32,
) -> Result<()> {
    if url.is_none() && matches!(source, Source::ICal | Source::Notion) {
        anyhow::bail!("source '{source}' needs a --url");
    }

    let mut config = CalendarConfig::new(name, source, url);
    config.sync_frequency_per_day = frequency;
    let id = config.id.clone();

    hearth.add_calendar(config);
    hearth.save(data_dir)?;

    println!("Added calendar '{name}' ({id})");
    Ok(())
}

pub fn remove(hearth: &Hearth, data_dir: &Path, id: &str) -> Result<()> {
    if !hearth.remove_calendar(id) {
        anyhow::bail!("no calendar with id '{id}'");
    }
    hearth.save(data_dir)?;

    println!("Removed calendar '{id}' and all of its events");
    Ok(())
}
