mod commands;
mod local_source;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hearth_core::config::HearthConfig;
use hearth_core::{Hearth, Source};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hearth-cli")]
#[command(about = "Aggregate household calendars and view them as timeline, week or month")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every known calendar (configured feeds and discovered ones)
    Calendars,
    /// Add a calendar feed
    Add {
        name: String,

        /// Source kind: local, ical, notion or google
        #[arg(short, long, default_value = "local")]
        source: String,

        /// Feed url (ical/notion sources)
        #[arg(short, long)]
        url: Option<String>,

        /// Scheduled syncs per day (0 = manual only)
        #[arg(long, default_value_t = 0)]
        frequency: u32,
    },
    /// Remove a calendar and all of its events
    Remove { id: String },
    /// Change which calendars are shown in views
    Select {
        /// Calendar id to select
        id: Option<String>,

        /// Deselect instead of select
        #[arg(long)]
        off: bool,

        /// Select every calendar
        #[arg(long)]
        all: bool,

        /// Deselect every calendar
        #[arg(long)]
        none: bool,

        /// Select only calendars that currently have events
        #[arg(long)]
        with_events: bool,
    },
    /// Sync one calendar, or every enabled calendar
    Sync {
        /// Only sync this calendar (by id)
        #[arg(short, long)]
        calendar: Option<String>,
    },
    /// Show per-calendar sync status
    Status,
    /// Print a projection of the selected calendars
    View {
        #[command(subcommand)]
        view: commands::view::ViewArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = HearthConfig::load()?;
    let data_dir = config.data_path()?;
    let fetcher = Arc::new(local_source::LocalDirFetcher::new(data_dir.clone()));
    let hearth = Hearth::open(&data_dir, fetcher)?;

    match cli.command {
        Commands::Calendars => commands::calendars::list(&hearth),
        Commands::Add {
            name,
            source,
            url,
            frequency,
        } => {
            let source = parse_source(&source)?;
            commands::calendars::add(&hearth, &data_dir, &name, source, url, frequency)
        }
        Commands::Remove { id } => commands::calendars::remove(&hearth, &data_dir, &id),
        Commands::Select {
            id,
            off,
            all,
            none,
            with_events,
        } => commands::select::run(&hearth, id.as_deref(), off, all, none, with_events),
        Commands::Sync { calendar } => {
            commands::sync::run(&hearth, &data_dir, calendar.as_deref()).await
        }
        Commands::Status => commands::sync::status(&hearth),
        Commands::View { view } => commands::view::run(&hearth, &view),
    }
}

fn parse_source(s: &str) -> Result<Source> {
    match s {
        "local" => Ok(Source::Local),
        "ical" => Ok(Source::ICal),
        "notion" => Ok(Source::Notion),
        "google" => Ok(Source::Google),
        other => anyhow::bail!("unknown source '{other}' (expected local, ical, notion or google)"),
    }
}
