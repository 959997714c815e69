//! Calendar configuration and the registry's merged view of a calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Source;

/// An explicitly configured calendar feed.
///
/// Stored in the `calendars` table. Google and Local calendars have no
/// `url`; their transport details live with the external collaborator that
/// fetches for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub id: String,
    pub name: String,
    pub color: String,
    pub source: Source,
    /// Whether this calendar participates in sync. Display filtering is a
    /// separate concern (the selection set).
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 0 means manual sync only (the default).
    #[serde(default)]
    pub sync_frequency_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl CalendarConfig {
    pub fn new(name: &str, source: Source, url: Option<String>) -> Self {
        CalendarConfig {
            id: format!("{}-{}", source.id_prefix(), Uuid::new_v4()),
            name: name.to_string(),
            color: source.default_color().to_string(),
            source,
            enabled: true,
            url,
            sync_frequency_per_day: 0,
            last_sync: None,
        }
    }

    /// Seconds between scheduled syncs, or `None` for manual-only.
    pub fn sync_interval_secs(&self) -> Option<i64> {
        if self.sync_frequency_per_day == 0 {
            None
        } else {
            Some(86_400 / i64::from(self.sync_frequency_per_day))
        }
    }
}

/// A calendar as presented to filter/settings consumers: the merge of
/// explicit configuration and calendars discovered from stored events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub color: String,
    pub source: Source,
    pub enabled: bool,
    pub url: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
    /// Recomputed from the live event set on every registry read.
    pub event_count: usize,
    /// False for orphaned calendars (known only through their events).
    pub configured: bool,
}

impl Calendar {
    pub fn has_events(&self) -> bool {
        self.event_count > 0
    }
}

impl std::fmt::Display for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.source)
    }
}
