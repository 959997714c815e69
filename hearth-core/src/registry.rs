//! The calendar registry: one merged, read-only list of every calendar the
//! household knows about.
//!
//! Two sources of truth feed it: explicit feed configuration, and the
//! distinct calendar ids observed in stored events. Configuration wins for
//! name/color/url; calendars known only through events are "orphaned"
//! (e.g. a feed that was synced once and then lost its config) and get
//! best-effort identity derived from their id. Event counts are always
//! recomputed from the live event set so they cannot drift after
//! deletions.

use crate::calendar::Calendar;
use crate::event::Source;
use crate::store::Snapshot;

/// Build the registry from a store snapshot.
pub fn registry(snapshot: &Snapshot) -> Vec<Calendar> {
    let mut calendars: Vec<Calendar> = snapshot
        .calendars
        .values()
        .map(|config| Calendar {
            id: config.id.clone(),
            name: config.name.clone(),
            color: config.color.clone(),
            source: config.source,
            enabled: config.enabled,
            url: config.url.clone(),
            last_sync: config.last_sync,
            event_count: snapshot.event_count_for(&config.id),
            configured: true,
        })
        .collect();

    for id in snapshot.observed_calendar_ids() {
        if snapshot.calendars.contains_key(id) {
            continue;
        }
        calendars.push(orphan(id, snapshot));
    }

    calendars.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    calendars
}

/// A calendar with no config: identity is reconstructed from what the
/// events give us. It cannot sync (no url, not enabled) but stays
/// selectable so its events remain visible.
fn orphan(id: &str, snapshot: &Snapshot) -> Calendar {
    let source = Source::from_calendar_id(id).unwrap_or(Source::Local);
    Calendar {
        id: id.to_string(),
        name: orphan_display_name(id),
        color: source.default_color().to_string(),
        source,
        enabled: false,
        url: None,
        last_sync: None,
        event_count: snapshot.event_count_for(id),
        configured: false,
    }
}

/// Fallback display name: the id with its source prefix stripped.
fn orphan_display_name(id: &str) -> String {
    let stem = Source::from_calendar_id(id)
        .map(|s| id.trim_start_matches(s.id_prefix()).trim_start_matches('-'))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(id);
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarConfig;
    use crate::event::{Event, TimeSpec};
    use crate::store::Store;
    use chrono::NaiveDate;

    fn event(id: &str, calendar_id: &str) -> Event {
        Event {
            id: id.into(),
            calendar_id: calendar_id.into(),
            title: "E".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            time_spec: TimeSpec::AllDay,
            location: None,
            description: None,
            color: None,
            source: Source::ICal,
        }
    }

    #[test]
    fn config_is_authoritative_for_known_calendars() {
        let store = Store::new();
        let mut config = CalendarConfig::new("School feed", Source::ICal, Some("https://x".into()));
        config.id = "ical-school".into();
        store.upsert_calendar(config);
        store.replace_calendar_events("ical-school", vec![event("e1", "ical-school")]);

        let registry = registry(&store.snapshot());
        assert_eq!(registry.len(), 1);
        let cal = &registry[0];
        assert_eq!(cal.name, "School feed");
        assert_eq!(cal.url.as_deref(), Some("https://x"));
        assert_eq!(cal.event_count, 1);
        assert!(cal.configured);
    }

    #[test]
    fn calendar_known_only_through_events_is_orphaned() {
        let store = Store::new();
        store.replace_calendar_events("notion-recipes", vec![event("n1", "notion-recipes")]);

        let registry = registry(&store.snapshot());
        assert_eq!(registry.len(), 1);
        let cal = &registry[0];
        assert!(!cal.configured);
        assert!(!cal.enabled);
        assert_eq!(cal.source, Source::Notion);
        assert_eq!(cal.name, "recipes");
        assert!(cal.url.is_none());
        assert_eq!(cal.event_count, 1);
    }

    #[test]
    fn event_counts_recompute_after_deletion() {
        let store = Store::new();
        let mut config = CalendarConfig::new("Feed", Source::ICal, None);
        config.id = "ical-a".into();
        store.upsert_calendar(config);
        store.replace_calendar_events("ical-a", vec![event("e1", "ical-a"), event("e2", "ical-a")]);
        assert_eq!(registry(&store.snapshot())[0].event_count, 2);

        store.replace_calendar_events("ical-a", vec![]);
        let after = registry(&store.snapshot());
        assert_eq!(after[0].event_count, 0);
        assert!(!after[0].has_events());
    }

    #[test]
    fn registry_sorts_by_name_case_insensitively() {
        let store = Store::new();
        for (id, name) in [("ical-b", "beta"), ("ical-a", "Alpha"), ("ical-z", "ZEBRA")] {
            let mut config = CalendarConfig::new(name, Source::ICal, None);
            config.id = id.into();
            store.upsert_calendar(config);
        }

        let names: Vec<String> = registry(&store.snapshot())
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "ZEBRA"]);
    }
}
