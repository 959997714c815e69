//! Canonical event types.
//!
//! Every source record is normalized into [`Event`] before anything else in
//! the core touches it. The [`TimeSpec`] tag is the load-bearing part: an
//! event's temporal kind is decided exactly once, at normalization, and
//! never re-inferred from display strings downstream.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which collaborator a calendar (and its events) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    ICal,
    Notion,
    Google,
}

impl Source {
    /// Prefix used when minting calendar ids (`ical-<uuid>` etc).
    ///
    /// The registry relies on this convention to infer the source of a
    /// calendar that is only known through stored events.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::ICal => "ical",
            Source::Notion => "notion",
            Source::Google => "google",
        }
    }

    /// Infer a source from a calendar id's prefix.
    pub fn from_calendar_id(id: &str) -> Option<Source> {
        let prefix = id.split('-').next()?;
        match prefix {
            "local" => Some(Source::Local),
            "ical" => Some(Source::ICal),
            "notion" => Some(Source::Notion),
            "google" => Some(Source::Google),
            _ => None,
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            Source::Local => "#0ea5e9",
            Source::ICal => "#7c3aed",
            Source::Notion => "#f59e0b",
            Source::Google => "#22c55e",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// The temporal kind of an event, decided at normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeSpec {
    /// Starts (and usually ends) at a specific time on a single day.
    Timed {
        start: NaiveTime,
        end: Option<NaiveTime>,
    },
    /// Occupies one whole calendar day.
    AllDay,
    /// Spans `span_days` (>= 2) consecutive calendar days.
    MultiDay { span_days: u32 },
}

impl TimeSpec {
    /// Number of calendar days the event occupies (1 for Timed/AllDay).
    pub fn span_days(&self) -> u32 {
        match self {
            TimeSpec::Timed { .. } | TimeSpec::AllDay => 1,
            TimeSpec::MultiDay { span_days } => (*span_days).max(2),
        }
    }
}

/// A normalized calendar event.
///
/// Immutable once produced; re-syncing a calendar replaces its events
/// wholesale rather than mutating them in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique within the owning calendar, stable across re-syncs.
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    /// Day the event starts, for bucketing purposes.
    pub date: NaiveDate,
    pub time_spec: TimeSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display color; `None` falls back to the owning calendar's color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub source: Source,
}

impl Event {
    /// Last calendar day this event occupies.
    pub fn last_day(&self) -> NaiveDate {
        self.date + Duration::days(i64::from(self.time_spec.span_days()) - 1)
    }

    /// Whether the event occupies the given day.
    ///
    /// The occupied range is `[date, date + span_days - 1]`, inclusive.
    pub fn occupies(&self, day: NaiveDate) -> bool {
        day >= self.date && day <= self.last_day()
    }

    /// Start time for within-day ordering (`None` for non-timed events).
    pub fn start_time(&self) -> Option<NaiveTime> {
        match self.time_spec {
            TimeSpec::Timed { start, .. } => Some(start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: NaiveDate, time_spec: TimeSpec) -> Event {
        Event {
            id: "e1".into(),
            calendar_id: "local-test".into(),
            title: "Test".into(),
            date,
            time_spec,
            location: None,
            description: None,
            color: None,
            source: Source::Local,
        }
    }

    #[test]
    fn single_day_events_occupy_exactly_one_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        for spec in [
            TimeSpec::AllDay,
            TimeSpec::Timed {
                start: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                end: None,
            },
        ] {
            let e = event(date, spec);
            assert_eq!(e.last_day(), date);
            assert!(e.occupies(date));
            assert!(!e.occupies(date + Duration::days(1)));
            assert!(!e.occupies(date - Duration::days(1)));
        }
    }

    #[test]
    fn multi_day_event_occupies_its_whole_span() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let e = event(date, TimeSpec::MultiDay { span_days: 3 });

        assert_eq!(e.last_day(), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert!(e.occupies(date));
        assert!(e.occupies(date + Duration::days(2)));
        assert!(!e.occupies(date + Duration::days(3)));
    }

    #[test]
    fn source_roundtrips_through_calendar_id_prefix() {
        for source in [Source::Local, Source::ICal, Source::Notion, Source::Google] {
            let id = format!("{}-1234", source.id_prefix());
            assert_eq!(Source::from_calendar_id(&id), Some(source));
        }
        assert_eq!(Source::from_calendar_id("mystery-1"), None);
    }
}
