//! Fetcher for locally entered events.
//!
//! Local calendars keep their raw entries as JSON files under
//! `<data_dir>/local/<calendar_id>.json`; syncing a local calendar just
//! re-reads that file. Remote sources need a transport collaborator this
//! CLI does not ship, so they come back as unavailable and the sync
//! cycle fails without touching stored events.

use std::path::PathBuf;

use async_trait::async_trait;
use hearth_core::calendar::CalendarConfig;
use hearth_core::normalize::{RawLocalEvent, RawRecord, RawUnavailable};
use hearth_core::{Source, SourceFetch, SyncError};

pub struct LocalDirFetcher {
    data_dir: PathBuf,
}

impl LocalDirFetcher {
    pub fn new(data_dir: PathBuf) -> Self {
        LocalDirFetcher { data_dir }
    }

    fn entries_path(&self, calendar_id: &str) -> PathBuf {
        self.data_dir.join("local").join(format!("{calendar_id}.json"))
    }
}

#[async_trait]
impl SourceFetch for LocalDirFetcher {
    async fn fetch(&self, calendar: &CalendarConfig) -> Result<Vec<RawRecord>, SyncError> {
        if calendar.source != Source::Local {
            return Ok(vec![RawRecord::Unavailable(RawUnavailable {
                origin: calendar.source,
                reason: format!("no transport configured for source '{}'", calendar.source),
            })]);
        }

        let path = self.entries_path(&calendar.id);
        if !path.exists() {
            // A local calendar with no entries file is genuinely empty.
            return Ok(vec![]);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SyncError::Unknown(format!("could not read {}: {e}", path.display())))?;
        let entries: Vec<RawLocalEvent> = serde_json::from_str(&content)
            .map_err(|e| SyncError::ParseFailure(format!("{}: {e}", path.display())))?;

        Ok(entries.into_iter().map(RawRecord::Local).collect())
    }
}
